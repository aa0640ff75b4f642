//! # Mailer
//!
//! Templated notifications on top of an [`EmailService`] transport:
//! password reset, email verification, temporary password and the tutor
//! request acknowledgement. Template links come from
//! [`crate::utils::static_object`].

use std::sync::Arc;

use tracing::{error, instrument};

use super::email::{EmailBody, EmailError, EmailService};
use crate::models::PopulatedTutorRequest;
use crate::utils::constant::MAX_ACKNOWLEDGED_TUTOR_BLOCKS;
use crate::utils::html::{generate_acknowledgement_html, generate_reset_password_html};
use crate::utils::static_object::{RESET_PASSWORD_URL, VERIFY_EMAIL_URL};

pub const RESET_PASSWORD_SUBJECT: &str = "Reset Your TutorMe Password";
pub const VERIFICATION_SUBJECT: &str = "Email Verification";
pub const TEMPORARY_PASSWORD_SUBJECT: &str = "Your Temporary Password for TutorMe";
pub const ACKNOWLEDGEMENT_SUBJECT: &str = "Tutor Request Received – Tuition Lanka";

/// Notification gateway used by the services.
#[derive(Clone)]
pub struct Mailer {
    transport: Arc<dyn EmailService>,
}

impl Mailer {
    pub fn new(transport: Arc<dyn EmailService>) -> Self {
        Self { transport }
    }

    /// Checks that the underlying transport is reachable.
    pub async fn verify(&self) -> Result<(), EmailError> {
        self.transport.verify().await
    }

    /// Sends a plain-text email.
    pub async fn send_email(&self, to: &str, subject: &str, text: &str) -> Result<(), EmailError> {
        self.transport
            .send_email(to, subject, &EmailBody::text(text))
            .await
    }

    #[instrument(skip(self, token), fields(recipient = %to))]
    pub async fn send_reset_password_email(&self, to: &str, token: &str) -> Result<(), EmailError> {
        let reset_password_url = format!("{}?token={token}", *RESET_PASSWORD_URL);
        let text = format!(
            "
Hello,

We received a request to reset the password for your TutorMe account.

Reset your password using the link below:
{reset_password_url}

If you didn't request this, please ignore this email.
"
        );
        let body = EmailBody::with_html(text, generate_reset_password_html(&reset_password_url));

        self.transport
            .send_email(to, RESET_PASSWORD_SUBJECT, &body)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send reset password email");
                EmailError::SendFailed("Email sending failed".into())
            })
    }

    #[instrument(skip(self, token), fields(recipient = %to))]
    pub async fn send_verification_email(&self, to: &str, token: &str) -> Result<(), EmailError> {
        let verification_email_url = format!("{}?token={token}", *VERIFY_EMAIL_URL);
        let text = format!(
            "Dear user,
To verify your email, click on this link: {verification_email_url}
If you did not create an account, then ignore this email."
        );
        self.send_email(to, VERIFICATION_SUBJECT, &text).await
    }

    #[instrument(skip(self, temp_password), fields(recipient = %to))]
    pub async fn send_temporary_password_email(
        &self,
        to: &str,
        username: &str,
        temp_password: &str,
    ) -> Result<(), EmailError> {
        let text = format!(
            "
Dear {username},

A temporary password has been generated for your account.

=====================================
Temporary Password: {temp_password}
=====================================

Security Notice:
- Please log in immediately and change your password to something secure.
- Do not share this password with anyone.

If you did not request this, please contact support.

Thanks,
The TutorMe support team."
        );

        self.send_email(to, TEMPORARY_PASSWORD_SUBJECT, &text)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send temporary password email");
                EmailError::SendFailed("Email sending failed".into())
            })
    }

    /// Confirms receipt of a tutor request to the requester's email address.
    #[instrument(skip_all, fields(tutor_request_id = %request.id, recipient = %request.email))]
    pub async fn send_acknowledgement(
        &self,
        request: &PopulatedTutorRequest,
    ) -> Result<(), EmailError> {
        let body = EmailBody::with_html(
            acknowledgement_text(request),
            generate_acknowledgement_html(request),
        );

        self.transport
            .send_email(&request.email, ACKNOWLEDGEMENT_SUBJECT, &body)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send acknowledgement email");
                EmailError::SendFailed("Acknowledgement email failed".into())
            })
    }
}

fn acknowledgement_text(request: &PopulatedTutorRequest) -> String {
    let grade = if request.grade.is_empty() {
        "N/A".to_string()
    } else {
        request
            .grade
            .iter()
            .map(|g| g.title.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let tutor_details = request
        .tutors
        .iter()
        .take(MAX_ACKNOWLEDGED_TUTOR_BLOCKS)
        .enumerate()
        .map(|(index, block)| {
            let subjects = block
                .subjects
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "
Tutor {} Details
Subjects: {subjects}
Class Duration: {}
Frequency: {}
Preferred Tutor Type: {}
",
                index + 1,
                block.duration,
                block.frequency,
                block.preferred_tutor_type
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "
Dear {name},

Thank you for submitting your tutor request with Tuition Lanka.
We're happy to inform you that we have successfully received your request.

👤 Student Details
Full Name: {name}
Email: {email}
Phone Number: {phone}
District: {district}
City: {city}

Academic Preferences
Medium: {medium}
Grade: {grade}
Number of Tutors Requested: {count}

{tutor_details}

Our team has now started processing your request. We will carefully review your requirements and contact you soon.

Warm regards,
Tuition Lanka Team
Tuition Lanka – Learn Better, Achieve More
",
        name = request.name,
        email = request.email,
        phone = request.phone_number,
        district = request.district,
        city = request.city,
        medium = request.medium,
        count = request.tutors.len(),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::*;
    use crate::models::{GradeRef, PopulatedTutorBlock, RequestStatus, SubjectRef};

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<(String, String, EmailBody)>>,
    }

    #[async_trait]
    impl EmailService for Recorder {
        async fn send_email(
            &self,
            recipient: &str,
            subject: &str,
            body: &EmailBody,
        ) -> Result<(), EmailError> {
            self.sent
                .lock()
                .unwrap()
                .push((recipient.into(), subject.into(), body.clone()));
            Ok(())
        }
    }

    struct Broken;

    #[async_trait]
    impl EmailService for Broken {
        async fn send_email(&self, _: &str, _: &str, _: &EmailBody) -> Result<(), EmailError> {
            Err(EmailError::SendFailed("connection refused".into()))
        }
    }

    fn populated(blocks: usize, grades: &[&str]) -> PopulatedTutorRequest {
        let now = OffsetDateTime::now_utc();
        PopulatedTutorRequest {
            id: Uuid::new_v4(),
            name: "Nimal <b>".into(),
            email: "nimal@example.com".into(),
            phone_number: "0771234567".into(),
            district: "Colombo".into(),
            city: "Maharagama".into(),
            medium: "Sinhala".into(),
            grade: grades
                .iter()
                .map(|title| GradeRef {
                    id: Uuid::new_v4(),
                    title: title.to_string(),
                })
                .collect(),
            status: RequestStatus::Pending,
            tutors: (0..blocks)
                .map(|i| PopulatedTutorBlock {
                    id: Uuid::new_v4(),
                    subjects: vec![
                        SubjectRef {
                            id: Uuid::new_v4(),
                            name: format!("Subject {i}"),
                        },
                        SubjectRef {
                            id: Uuid::new_v4(),
                            name: "Science".into(),
                        },
                    ],
                    duration: "2 hours".into(),
                    frequency: "Weekly".into(),
                    preferred_tutor_type: "Graduate".into(),
                    assigned_tutor: None,
                })
                .collect(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn acknowledgement_lists_at_most_four_blocks() {
        let recorder = Arc::new(Recorder::default());
        let mailer = Mailer::new(recorder.clone());

        mailer
            .send_acknowledgement(&populated(5, &["Grade 10", "Grade 11"]))
            .await
            .unwrap();

        let sent = recorder.sent.lock().unwrap();
        let (recipient, subject, body) = &sent[0];
        assert_eq!(recipient, "nimal@example.com");
        assert_eq!(subject, ACKNOWLEDGEMENT_SUBJECT);
        assert!(body.text.contains("Number of Tutors Requested: 5"));
        assert!(body.text.contains("Grade: Grade 10, Grade 11"));
        assert!(body.text.contains("Tutor 4 Details"));
        assert!(!body.text.contains("Tutor 5 Details"));
        assert!(body.text.contains("Subjects: Subject 0, Science"));

        let html = body.html.as_deref().unwrap();
        assert!(html.contains("Nimal &lt;b&gt;"));
        assert!(!html.contains("Tutor 5 Details"));
    }

    #[tokio::test]
    async fn acknowledgement_without_grades_says_not_available() {
        let recorder = Arc::new(Recorder::default());
        let mailer = Mailer::new(recorder.clone());

        mailer.send_acknowledgement(&populated(1, &[])).await.unwrap();

        let sent = recorder.sent.lock().unwrap();
        assert!(sent[0].2.text.contains("Grade: N/A"));
    }

    #[tokio::test]
    async fn reset_password_email_carries_token_link() {
        let recorder = Arc::new(Recorder::default());
        let mailer = Mailer::new(recorder.clone());

        mailer
            .send_reset_password_email("user@example.com", "tok123")
            .await
            .unwrap();

        let sent = recorder.sent.lock().unwrap();
        let (_, subject, body) = &sent[0];
        assert_eq!(subject, RESET_PASSWORD_SUBJECT);
        assert!(body.text.contains("reset-password?token=tok123"));
        assert!(body.html.as_deref().unwrap().contains("Reset Password"));
    }

    #[tokio::test]
    async fn verification_and_temporary_password_are_plain_text() {
        let recorder = Arc::new(Recorder::default());
        let mailer = Mailer::new(recorder.clone());

        mailer
            .send_verification_email("user@example.com", "v-token")
            .await
            .unwrap();
        mailer
            .send_temporary_password_email("user@example.com", "kasun", "Xy9#temp")
            .await
            .unwrap();

        let sent = recorder.sent.lock().unwrap();
        assert_eq!(sent[0].1, VERIFICATION_SUBJECT);
        assert!(sent[0].2.text.contains("verify-email?token=v-token"));
        assert!(sent[0].2.html.is_none());
        assert_eq!(sent[1].1, TEMPORARY_PASSWORD_SUBJECT);
        assert!(sent[1].2.text.contains("Dear kasun,"));
        assert!(sent[1].2.text.contains("Temporary Password: Xy9#temp"));
    }

    #[tokio::test]
    async fn transport_failures_are_wrapped() {
        let mailer = Mailer::new(Arc::new(Broken));

        let err = mailer
            .send_acknowledgement(&populated(1, &["Grade 5"]))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to send email: Acknowledgement email failed"
        );

        let err = mailer
            .send_reset_password_email("user@example.com", "t")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to send email: Email sending failed");

        // Verification emails surface the transport error unchanged.
        let err = mailer
            .send_verification_email("user@example.com", "t")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to send email: connection refused");
    }
}
