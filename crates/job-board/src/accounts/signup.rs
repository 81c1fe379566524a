use serde::{Deserialize, Serialize};

use super::domain::{Role, User, UserId};
use crate::config::SignupPolicy;
use crate::validation::{non_blank, ValidationErrors};

/// Raw signup payload as submitted by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub admin_code: Option<String>,
}

/// Validated account awaiting an identifier from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub role: Role,
    pub superuser: bool,
    pub company: Option<String>,
    pub summary: String,
    pub skills: String,
}

impl NewAccount {
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            username: self.username,
            email: self.email,
            role: self.role,
            superuser: self.superuser,
            disabled: false,
            company: self.company,
            summary: self.summary,
            skills: self.skills,
        }
    }
}

/// Validates signup requests against the configured admin rules.
#[derive(Debug, Clone)]
pub struct SignupValidator {
    policy: SignupPolicy,
}

impl SignupValidator {
    pub fn new(policy: SignupPolicy) -> Self {
        Self { policy }
    }

    pub fn validate(&self, request: &SignupRequest) -> Result<NewAccount, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let username = request.username.trim().to_string();
        if username.is_empty() {
            errors.add("username", "Username is required.");
        } else if username.chars().count() > 150 {
            errors.add("username", "Username must be at most 150 characters.");
        } else if !username.chars().all(is_username_char) {
            errors.add(
                "username",
                "Username may only contain letters, digits and @/./+/-/_ characters.",
            );
        }

        let role = match Role::parse(&request.role) {
            Some(Role::Admin) if !self.policy.allow_admin_signup => {
                errors.add("role", "Admin signup is disabled.");
                None
            }
            Some(role) => Some(role),
            None => {
                errors.add("role", "Invalid role.");
                None
            }
        };

        let company = non_blank(request.company.as_deref());
        let summary = non_blank(request.summary.as_deref());
        let skills = non_blank(request.skills.as_deref());

        match role {
            Some(Role::Employer) if company.is_none() => {
                errors.add("company", "Company name is required for employer accounts.");
            }
            Some(Role::Applicant) => {
                if summary.is_none() {
                    errors.add("summary", "Profile summary is required for applicants.");
                }
                if skills.is_none() {
                    errors.add("skills", "Skills are required for applicants.");
                }
            }
            Some(Role::Admin) => match non_blank(request.admin_code.as_deref()) {
                None => errors.add("admin_code", "Admin invite code is required."),
                Some(code) if code != self.policy.admin_invite_code => {
                    errors.add("admin_code", "Invalid admin invite code.")
                }
                Some(_) => {}
            },
            _ => {}
        }

        let Some(role) = role else {
            return Err(errors);
        };

        // Fields that do not apply to the chosen role are dropped.
        let account = match role {
            Role::Admin => NewAccount {
                username,
                email: request.email.trim().to_string(),
                role,
                superuser: true,
                company: None,
                summary: String::new(),
                skills: String::new(),
            },
            Role::Employer => NewAccount {
                username,
                email: request.email.trim().to_string(),
                role,
                superuser: false,
                company,
                summary: String::new(),
                skills: String::new(),
            },
            Role::Applicant => NewAccount {
                username,
                email: request.email.trim().to_string(),
                role,
                superuser: false,
                company: None,
                summary: summary.unwrap_or_default(),
                skills: skills.unwrap_or_default(),
            },
        };

        errors.finish(account)
    }
}

fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> SignupValidator {
        SignupValidator::new(SignupPolicy {
            allow_admin_signup: true,
            admin_invite_code: "LETMEIN".to_string(),
        })
    }

    fn request(role: &str) -> SignupRequest {
        SignupRequest {
            username: "dana".to_string(),
            email: "dana@example.com".to_string(),
            role: role.to_string(),
            company: Some("Acme".to_string()),
            summary: Some("Backend engineer".to_string()),
            skills: Some("Rust, SQL".to_string()),
            admin_code: None,
        }
    }

    #[test]
    fn username_is_limited_to_word_characters() {
        for username in ["a\"b", "a\nb", "a b", "a/b"] {
            let mut applicant = request("applicant");
            applicant.username = username.to_string();

            let errors = validator()
                .validate(&applicant)
                .expect_err("username refused");
            assert!(errors.has("username"), "{username:?} accepted");
        }

        let mut applicant = request("applicant");
        applicant.username = "dana.o+jobs@home_1-x".to_string();
        assert!(validator().validate(&applicant).is_ok());
    }

    #[test]
    fn employer_requires_company() {
        let mut employer = request("employer");
        employer.company = Some("   ".to_string());

        let errors = validator().validate(&employer).expect_err("company missing");
        assert!(errors.has("company"));
    }

    #[test]
    fn applicant_requires_summary_and_skills() {
        let mut applicant = request("applicant");
        applicant.summary = None;
        applicant.skills = None;

        let errors = validator().validate(&applicant).expect_err("profile missing");
        assert!(errors.has("summary"));
        assert!(errors.has("skills"));
    }

    #[test]
    fn applicant_profile_drops_company() {
        let account = validator()
            .validate(&request("applicant"))
            .expect("valid applicant");
        assert_eq!(account.role, Role::Applicant);
        assert_eq!(account.company, None);
        assert_eq!(account.skills, "Rust, SQL");
        assert!(!account.superuser);
    }

    #[test]
    fn admin_needs_matching_invite_code() {
        let mut admin = request("admin");
        let errors = validator().validate(&admin).expect_err("code missing");
        assert!(errors.has("admin_code"));

        admin.admin_code = Some("nope".to_string());
        let errors = validator().validate(&admin).expect_err("wrong code");
        assert!(errors.to_string().contains("Invalid admin invite code"));

        admin.admin_code = Some("LETMEIN".to_string());
        let account = validator().validate(&admin).expect("valid admin");
        assert!(account.superuser);
        assert!(account.summary.is_empty());
        assert_eq!(account.company, None);
    }

    #[test]
    fn admin_signup_can_be_disabled() {
        let validator = SignupValidator::new(SignupPolicy {
            allow_admin_signup: false,
            admin_invite_code: "LETMEIN".to_string(),
        });
        let mut admin = request("admin");
        admin.admin_code = Some("LETMEIN".to_string());

        let errors = validator.validate(&admin).expect_err("admin disabled");
        assert!(errors.has("role"));
    }

    #[test]
    fn unknown_role_is_rejected() {
        let errors = validator()
            .validate(&request("moderator"))
            .expect_err("bad role");
        assert!(errors.has("role"));
    }
}
