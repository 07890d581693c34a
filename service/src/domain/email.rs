//! [`Email`] definitions.

use crate::domain::user;

/// Email message ready to be delivered.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Email {
    /// Address to deliver this [`Email`] to.
    pub to: user::Email,

    /// Subject line of this [`Email`].
    pub subject: String,

    /// HTML body of this [`Email`].
    pub html: String,
}

/// HTML template an [`Email`] is rendered from.
///
/// Placeholders are written as `{{key}}`. Unknown placeholders are kept as
/// is, and every substituted value is HTML-escaped.
pub trait Template {
    /// HTML source of this [`Template`].
    const SOURCE: &'static str;

    /// Returns the subject line of the rendered [`Email`].
    fn subject(&self) -> String;

    /// Returns the values to substitute, keyed by placeholder.
    fn values(&self) -> Vec<(&'static str, &str)>;

    /// Renders this [`Template`] into an [`Email`] for the provided
    /// recipient.
    fn render(&self, to: user::Email) -> Email {
        Email {
            to,
            subject: self.subject(),
            html: fill(Self::SOURCE, &self.values()),
        }
    }
}

/// Notification about a new participant of an owned poll.
#[derive(Clone, Debug)]
pub struct NewParticipant {
    /// Name of the poll owner.
    pub name: user::Name,

    /// Name of the new participant.
    pub participant_name: user::Name,

    /// URL of the poll.
    pub poll_url: String,

    /// URL disabling further notifications about the poll.
    pub unsubscribe_url: String,

    /// Email address of the support.
    pub support_email: String,
}

impl Template for NewParticipant {
    const SOURCE: &'static str =
        include_str!("../../templates/new-participant.html");

    fn subject(&self) -> String {
        format!("{} has voted on your poll", self.participant_name)
    }

    fn values(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("name", self.name.as_ref()),
            ("participantName", self.participant_name.as_ref()),
            ("pollUrl", &self.poll_url),
            ("unsubscribeUrl", &self.unsubscribe_url),
            ("supportEmail", &self.support_email),
        ]
    }
}

/// Magic link logging a registered user in.
#[derive(Clone, Debug)]
pub struct LoginLink {
    /// Name of the user logging in.
    pub name: user::Name,

    /// Link to follow.
    pub link: String,
}

impl Template for LoginLink {
    const SOURCE: &'static str = include_str!("../../templates/login.html");

    fn subject(&self) -> String {
        "Login with your email".into()
    }

    fn values(&self) -> Vec<(&'static str, &str)> {
        vec![("name", self.name.as_ref()), ("link", &self.link)]
    }
}

/// Magic link completing a registration.
#[derive(Clone, Debug)]
pub struct RegistrationLink {
    /// Name of the user registering.
    pub name: user::Name,

    /// Link to follow.
    pub link: String,
}

impl Template for RegistrationLink {
    const SOURCE: &'static str = include_str!("../../templates/register.html");

    fn subject(&self) -> String {
        "Please verify your email address".into()
    }

    fn values(&self) -> Vec<(&'static str, &str)> {
        vec![("name", self.name.as_ref()), ("link", &self.link)]
    }
}

/// Substitutes the `{{key}}` placeholders of the provided `source`.
fn fill(source: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };
        let key = &after[..end];
        match values.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => escape_into(&mut out, value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

/// Appends the HTML-escaped `value` to the provided `out`put.
fn escape_into(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::user;

    use super::{fill, LoginLink, NewParticipant, Template as _};

    #[test]
    fn fills_placeholders() {
        assert_eq!(
            fill("Hi {{name}}, {{name}}!", &[("name", "Bob")]),
            "Hi Bob, Bob!",
        );
        assert_eq!(fill("{{unknown}} {{", &[]), "{{unknown}} {{");
        assert_eq!(fill("<b>{{x}}</b>", &[("x", "<i>&")]), "<b>&lt;i&gt;&amp;</b>");
    }

    #[test]
    fn renders_new_participant() {
        let email = NewParticipant {
            name: user::Name::new("Alice").unwrap(),
            participant_name: user::Name::new("Bob <script>").unwrap(),
            poll_url: "https://meet.example.com/poll/1".into(),
            unsubscribe_url: "https://meet.example.com/auth/disable?token=t"
                .into(),
            support_email: "support@meet.example.com".into(),
        }
        .render(user::Email::new("alice@example.com").unwrap());

        assert_eq!(email.to.to_string(), "alice@example.com");
        assert_eq!(email.subject, "Bob <script> has voted on your poll");
        assert!(email.html.contains("Hi Alice,"));
        assert!(email.html.contains("<strong>Bob &lt;script&gt;</strong>"));
        assert!(email.html.contains(r#"href="https://meet.example.com/poll/1""#));
        assert!(email
            .html
            .contains(r#"href="https://meet.example.com/auth/disable?token=t""#));
        assert!(email.html.contains("mailto:support@meet.example.com"));
        assert!(!email.html.contains("{{"));
    }

    #[test]
    fn renders_login_link() {
        let email = LoginLink {
            name: user::Name::new("Alice").unwrap(),
            link: "https://meet.example.com/auth/login?token=a&b".into(),
        }
        .render(user::Email::new("alice@example.com").unwrap());

        assert!(email
            .html
            .contains("https://meet.example.com/auth/login?token=a&amp;b"));
        assert!(!email.html.contains("{{"));
    }
}
