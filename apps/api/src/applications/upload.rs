use axum::extract::{multipart::MultipartError, Multipart};
use axum::http::StatusCode;
use bytes::Bytes;

use crate::errors::AppError;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug)]
pub struct ResumeFile {
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Fields of the multipart application form. Unknown fields are ignored.
#[derive(Debug, Default)]
pub struct ApplicationForm {
    pub job_id: Option<String>,
    pub cover_letter: Option<String>,
    pub location: Option<String>,
    pub resume: Option<ResumeFile>,
}

pub async fn read_application_form(mut multipart: Multipart) -> Result<ApplicationForm, AppError> {
    let mut form = ApplicationForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "resume" => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                form.resume = Some(ResumeFile {
                    content_type,
                    bytes,
                });
            }
            "job_id" => form.job_id = non_blank(field.text().await.map_err(multipart_error)?),
            "cover_letter" => {
                form.cover_letter = non_blank(field.text().await.map_err(multipart_error)?)
            }
            "location" => form.location = non_blank(field.text().await.map_err(multipart_error)?),
            _ => {}
        }
    }

    Ok(form)
}

/// Rejects anything that is not a PDF within the size limit.
pub fn validate_resume(file: &ResumeFile, max_bytes: usize) -> Result<(), AppError> {
    if file.bytes.len() > max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "Resume exceeds the {max_bytes} byte limit"
        )));
    }
    let declared_pdf = file
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.eq_ignore_ascii_case(PDF_CONTENT_TYPE));
    if !declared_pdf || !file.bytes.starts_with(PDF_MAGIC) {
        return Err(AppError::Validation("Only PDF files are allowed".to_string()));
    }
    Ok(())
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(format!("Malformed form data: {}", e.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{header::CONTENT_TYPE, Request};

    const BOUNDARY: &str = "XBOUNDARYX";

    fn multipart_body(parts: &[(&str, Option<(&str, &str)>, &str)]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, file, data) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file {
                Some((filename, content_type)) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                }
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(data.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn multipart_from(body: Vec<u8>) -> Multipart {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/applications")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_reads_all_fields() {
        let body = multipart_body(&[
            ("job_id", None, "6f1c2b9e-8d4e-4b7a-9f59-0d8f2a0c1e11"),
            ("cover_letter", None, "Hello there"),
            ("location", None, "  Lisbon "),
            ("resume", Some(("cv.pdf", "application/pdf")), "%PDF-1.7 data"),
            ("extra", None, "ignored"),
        ]);
        let form = read_application_form(multipart_from(body).await).await.unwrap();

        assert_eq!(
            form.job_id.as_deref(),
            Some("6f1c2b9e-8d4e-4b7a-9f59-0d8f2a0c1e11")
        );
        assert_eq!(form.cover_letter.as_deref(), Some("Hello there"));
        assert_eq!(form.location.as_deref(), Some("Lisbon"));
        let resume = form.resume.unwrap();
        assert_eq!(resume.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(&resume.bytes[..], b"%PDF-1.7 data");
    }

    #[tokio::test]
    async fn test_blank_text_fields_are_none() {
        let body = multipart_body(&[("job_id", None, "   "), ("cover_letter", None, "")]);
        let form = read_application_form(multipart_from(body).await).await.unwrap();
        assert!(form.job_id.is_none());
        assert!(form.cover_letter.is_none());
        assert!(form.resume.is_none());
    }

    fn file(content_type: Option<&str>, data: &'static [u8]) -> ResumeFile {
        ResumeFile {
            content_type: content_type.map(String::from),
            bytes: Bytes::from_static(data),
        }
    }

    #[test]
    fn test_valid_pdf_passes() {
        assert!(validate_resume(&file(Some("application/pdf"), b"%PDF-1.4\n..."), 1024).is_ok());
    }

    #[test]
    fn test_wrong_content_type_rejected() {
        let err = validate_resume(&file(Some("image/png"), b"%PDF-1.4"), 1024).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Only PDF files are allowed"));
        assert!(validate_resume(&file(None, b"%PDF-1.4"), 1024).is_err());
    }

    #[test]
    fn test_pdf_content_type_with_other_bytes_rejected() {
        assert!(validate_resume(&file(Some("application/pdf"), b"PK\x03\x04"), 1024).is_err());
    }

    #[test]
    fn test_oversized_file_rejected() {
        let err = validate_resume(&file(Some("application/pdf"), b"%PDF-1.4 0123456789"), 8)
            .unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
    }
}
