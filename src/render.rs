//! HTML for the single-page upload and result view.

use std::fmt::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::Result;
use crate::icons::{IconGroup, Severity, NO_ICON_MATCH};
use crate::report::ClassificationReport;

pub const ICON_ROUTE: &str = "/icons";

const TITLE: &str = "♻ Waste Classification Management App";
const SUBTITLE: &str =
    "Upload a waste image to identify its type and understand its environmental impact.";
const CAPTION: &str = "SDG (Sustainable Development Goals) icons are displayed based on classified waste to raise environmental awareness.";

const STYLE: &str = "\
body{font-family:sans-serif;margin:2rem;max-width:1400px}\
.columns{display:grid;grid-template-columns:1fr 1fr 1fr;gap:1.5rem;margin-top:1.5rem}\
.pair{display:grid;grid-template-columns:1fr 1fr;gap:.75rem}\
.banner{padding:.6rem .9rem;border-radius:.4rem;margin:.4rem 0}\
.info{background:#e8f1fb;color:#0b4a8b}\
.success{background:#e6f4ea;color:#1e6b34}\
.warning{background:#fff6e0;color:#7a5b00}\
.error{background:#fdecea;color:#8c1d18}\
img{width:100%;height:auto}\
.caption{color:#666;font-size:.85rem}";

pub struct UploadedImage {
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    pub fn new(bytes: Vec<u8>) -> Self {
        let mime = image::guess_format(&bytes)
            .map(|format| format.to_mime_type())
            .unwrap_or("application/octet-stream");
        UploadedImage { mime, bytes }
    }

    fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

pub enum ClassifyOutcome {
    Classified {
        upload: UploadedImage,
        report: ClassificationReport,
    },
    Failed {
        upload: Option<UploadedImage>,
        message: String,
    },
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes `text` and turns `**bold**` spans into `<strong>`.
pub fn emphasis(text: &str) -> String {
    let mut out = String::new();
    for (i, part) in escape(text).split("**").enumerate() {
        if i > 0 {
            out.push_str(if i % 2 == 1 { "<strong>" } else { "</strong>" });
        }
        out.push_str(part);
    }
    if text.matches("**").count() % 2 == 1 {
        out.push_str("</strong>");
    }
    out
}

fn banner(out: &mut String, class: &str, html: &str) {
    let _ = write!(out, r#"<div class="banner {class}">{html}</div>"#);
}

fn icon_column(out: &mut String, icons: &[&str]) {
    out.push_str("<div>");
    for icon in icons {
        let _ = write!(
            out,
            r#"<img src="{ICON_ROUTE}/{}" alt="SDG icon">"#,
            escape(icon)
        );
    }
    out.push_str("</div>");
}

fn icon_panel(out: &mut String, group: Option<&IconGroup>) {
    match group {
        Some(group) => {
            let class = match group.severity {
                Severity::Success => "success",
                Severity::Warning => "warning",
            };
            banner(out, class, &emphasis(&group.verdict()));
            out.push_str(r#"<div class="pair">"#);
            for column in group.columns {
                icon_column(out, column);
            }
            out.push_str("</div>");
        }
        None => banner(out, "warning", &escape(NO_ICON_MATCH)),
    }
}

fn results(out: &mut String, outcome: &ClassifyOutcome) {
    out.push_str(r#"<section class="columns">"#);

    out.push_str("<div>");
    banner(out, "info", "Uploaded Image");
    let upload = match outcome {
        ClassifyOutcome::Classified { upload, .. } => Some(upload),
        ClassifyOutcome::Failed { upload, .. } => upload.as_ref(),
    };
    if let Some(upload) = upload {
        let _ = write!(out, r#"<img src="{}" alt="Uploaded image">"#, upload.data_uri());
    }
    out.push_str("</div>");

    out.push_str("<div>");
    banner(out, "info", "Classification Result");
    match outcome {
        ClassifyOutcome::Classified { report, .. } => {
            icon_panel(out, report.icons);
            let _ = write!(
                out,
                "<p><strong>Confidence Score:</strong> {}</p>",
                report.confidence_percent()
            );
        }
        ClassifyOutcome::Failed { message, .. } => banner(out, "error", &escape(message)),
    }
    out.push_str("</div>");

    out.push_str("<div>");
    banner(out, "info", "Carbon Footprint Awareness");
    if let ClassifyOutcome::Classified { report, .. } = outcome {
        for line in &report.footprint {
            banner(out, "success", &emphasis(line));
        }
    }
    out.push_str("</div>");

    out.push_str("</section>");
}

fn label_listing(out: &mut String, labels: &Result<Vec<String>>) {
    match labels {
        Ok(labels) => {
            out.push_str("<details><summary>View all class labels the model can predict</summary><ol start=\"0\">");
            for label in labels {
                let _ = write!(out, "<li>{}</li>", escape(label));
            }
            out.push_str("</ol></details>");
        }
        Err(err) => banner(out, "error", &escape(&err.to_string())),
    }
}

/// The whole page; `outcome` is `None` before anything was classified.
pub fn page(labels: &Result<Vec<String>>, outcome: Option<&ClassifyOutcome>) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>Waste Classification</title><style>{STYLE}</style></head><body>\
         <h1>{TITLE}</h1><p>{SUBTITLE}</p>"
    );
    out.push_str(
        r#"<form method="post" action="/classify" enctype="multipart/form-data">
<label>Upload an image (JPG, PNG, JPEG) <input type="file" name="image" accept=".jpg,.jpeg,.png" required></label>
<button type="submit">Classify</button>
</form>"#,
    );

    if let Some(outcome) = outcome {
        results(&mut out, outcome);
    }

    label_listing(&mut out, labels);
    let _ = write!(out, "<hr><p class=\"caption\">{CAPTION}</p></body></html>");
    out
}
