//! # HTML Email Bodies
//!
//! Inline-styled HTML alternatives for outgoing emails. Every value that
//! originates from user input is escaped with [`escape`].

use crate::models::PopulatedTutorRequest;

use super::constant::MAX_ACKNOWLEDGED_TUTOR_BLOCKS;

/// Escapes the characters that are significant in HTML text and attributes.
pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Generates the HTML body of the password reset email, with a button
/// and a copyable fallback link.
pub fn generate_reset_password_html(reset_password_url: &str) -> String {
    let url = escape(reset_password_url);
    format!(
        r#"<div style="font-family: Arial, sans-serif; color: #222; line-height: 1.6;">
  <p>Hello,</p>
  <p>We received a request to reset the password for your <strong>TutorMe</strong> account.</p>
  <p>You can reset your password by clicking the button below:</p>
  <p style="text-align: center; margin: 25px 0;">
    <a href="{url}"
       style="background-color: #4F46E5; color: #fff; padding: 12px 24px;
              border-radius: 8px; text-decoration: none; font-weight: bold;">
      Reset Password
    </a>
  </p>
  <p>If the button above doesn't work, you can copy and paste this link into your browser:</p>
  <p style="word-break: break-all; color: #1d4ed8;">{url}</p>
  <p>If you did not request a password reset, please ignore this message.</p>
  <p>Thank you,<br><strong>The TutorMe Support Team</strong></p>
</div>"#
    )
}

/// Generates the HTML body of the tutor request acknowledgement.
///
/// Lists at most [`MAX_ACKNOWLEDGED_TUTOR_BLOCKS`] tutor blocks, while the
/// requested count always reflects all of them.
pub fn generate_acknowledgement_html(request: &PopulatedTutorRequest) -> String {
    let grade = if request.grade.is_empty() {
        "N/A".to_string()
    } else {
        request
            .grade
            .iter()
            .map(|g| escape(&g.title))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let blocks: String = request
        .tutors
        .iter()
        .take(MAX_ACKNOWLEDGED_TUTOR_BLOCKS)
        .enumerate()
        .map(|(index, block)| {
            let subjects = block
                .subjects
                .iter()
                .map(|s| escape(&s.name))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                r#"
  <h4>Tutor {number} Details</h4>
  <ul>
    <li><strong>Subjects:</strong> {subjects}</li>
    <li><strong>Class Duration:</strong> {duration}</li>
    <li><strong>Frequency:</strong> {frequency}</li>
    <li><strong>Preferred Tutor Type:</strong> {tutor_type}</li>
  </ul>"#,
                number = index + 1,
                duration = escape(&block.duration),
                frequency = escape(&block.frequency),
                tutor_type = escape(&block.preferred_tutor_type),
            )
        })
        .collect();

    format!(
        r#"<div style="font-family: Arial, sans-serif; color:#222; line-height:1.6">
  <p>Dear <strong>{name}</strong>,</p>

  <p>Thank you for submitting your tutor request with <strong>Tuition Lanka</strong>.
  We're happy to inform you that we have successfully received your request.</p>

  <h3>👤 Student Details</h3>
  <ul>
    <li><strong>Full Name:</strong> {name}</li>
    <li><strong>Email:</strong> {email}</li>
    <li><strong>Phone Number:</strong> {phone}</li>
    <li><strong>District:</strong> {district}</li>
    <li><strong>City:</strong> {city}</li>
  </ul>

  <h3>📘 Academic Preferences</h3>
  <ul>
    <li><strong>Medium:</strong> {medium}</li>
    <li><strong>Grade:</strong> {grade}</li>
    <li><strong>Number of Tutors Requested:</strong> {count}</li>
  </ul>
{blocks}

  <p>
    Our team has now started processing your request. We will carefully review your requirements,
    assign suitable tutors, and contact you shortly.
  </p>

  <p>
    Warm regards,<br/>
    <strong>Tuition Lanka Team</strong><br/>
    Tuition Lanka – Learn Better, Achieve More
  </p>
</div>"#,
        name = escape(&request.name),
        email = escape(&request.email),
        phone = escape(&request.phone_number),
        district = escape(&request.district),
        city = escape(&request.city),
        medium = escape(&request.medium),
        count = request.tutors.len(),
    )
}
