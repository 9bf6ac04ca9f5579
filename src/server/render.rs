use crate::server::pipeline::UploadOutcome;
use crate::services::vision::FaceResult;

/// Upload page. With an outcome the page also shows the stored image, labels,
/// faces and the error that stopped the upload, if any.
pub fn render_upload_page(outcome: Option<&UploadOutcome>) -> String {
    let results = outcome.map(render_outcome).unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Smart Photo Album</title>
<style>
body {{ font-family: system-ui, sans-serif; max-width: 720px; margin: 2rem auto; padding: 0 1rem; color: #1f2937; }}
form {{ border: 2px dashed #9ca3af; border-radius: 8px; padding: 1.5rem; margin-bottom: 1.5rem; }}
.error {{ background: #fee2e2; border: 1px solid #fca5a5; color: #b91c1c; padding: 0.75rem 1rem; border-radius: 6px; }}
.face {{ background: #f3f4f6; border-radius: 6px; padding: 0.75rem 1rem; margin-bottom: 0.75rem; }}
img {{ max-width: 100%; border-radius: 8px; }}
</style>
</head>
<body>
<h1>Smart Photo Album</h1>
<form action="/upload" method="post" enctype="multipart/form-data">
<input type="file" name="file" accept="image/*">
<button type="submit">Upload</button>
</form>
{results}
</body>
</html>"#,
        results = results,
    )
}

fn render_outcome(outcome: &UploadOutcome) -> String {
    let mut html = String::new();

    if let Some(error) = &outcome.error {
        html.push_str(&format!(
            r#"<p class="error">{}</p>"#,
            html_escape(&error.to_string())
        ));
    }

    if let Some(image_url) = &outcome.image_url {
        html.push_str(&format!(
            r#"<img src="{}" alt="uploaded image">"#,
            html_escape(image_url)
        ));
    }

    if !outcome.labels.is_empty() {
        let items = outcome
            .labels
            .iter()
            .map(|label| {
                format!(
                    "<li>{} ({:.2}%)</li>",
                    html_escape(&label.name),
                    label.confidence
                )
            })
            .collect::<String>();
        html.push_str(&format!("<h2>Labels</h2><ul>{}</ul>", items));
    }

    if !outcome.faces.is_empty() {
        let faces = outcome
            .faces
            .iter()
            .enumerate()
            .map(|(i, face)| render_face(i + 1, face))
            .collect::<String>();
        html.push_str(&format!("<h2>Faces</h2>{}", faces));
    }

    html
}

fn render_face(index: usize, face: &FaceResult) -> String {
    let emotions = face
        .top_emotions
        .iter()
        .map(|e| {
            format!(
                "<li>{} ({:.2}%)</li>",
                html_escape(&e.emotion),
                e.confidence
            )
        })
        .collect::<String>();

    format!(
        r#"<div class="face"><h3>Face {index}</h3><p>Gender: {gender} ({gender_confidence:.2}%)</p><p>Smile: {smile} ({smile_confidence:.2}%)</p><p>Top emotions:</p><ul>{emotions}</ul></div>"#,
        index = index,
        gender = html_escape(&face.gender),
        gender_confidence = face.gender_confidence,
        smile = if face.smile { "Yes" } else { "No" },
        smile_confidence = face.smile_confidence,
        emotions = emotions,
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
