//! Accounts, roles, signup validation and per-role landing pages.

pub mod domain;
pub mod signup;

pub use domain::{split_skills, Actor, Role, User, UserId};
pub use signup::{NewAccount, SignupRequest, SignupValidator};

pub const LOGIN_PATH: &str = "/accounts/login";

/// Where an actor lands after hitting the site root.
pub fn landing_path(actor: &Actor) -> &'static str {
    match actor.user() {
        None => "/jobs",
        Some(user) if user.is_superuser() => "/admin/",
        Some(user) => match user.role {
            Role::Admin => "/admin/",
            Role::Employer => "/dashboard/employer/",
            Role::Applicant => "/dashboard/applicant/",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, superuser: bool) -> User {
        User {
            id: UserId("usr-1".to_string()),
            username: "sam".to_string(),
            email: String::new(),
            role,
            superuser,
            disabled: false,
            company: None,
            summary: String::new(),
            skills: String::new(),
        }
    }

    #[test]
    fn landing_follows_role() {
        assert_eq!(landing_path(&Actor::Anonymous), "/jobs");
        assert_eq!(
            landing_path(&user(Role::Employer, false).into()),
            "/dashboard/employer/"
        );
        assert_eq!(
            landing_path(&user(Role::Applicant, false).into()),
            "/dashboard/applicant/"
        );
        assert_eq!(landing_path(&user(Role::Admin, true).into()), "/admin/");
        assert_eq!(landing_path(&user(Role::Applicant, true).into()), "/admin/");
    }

    #[test]
    fn skills_are_normalized() {
        assert_eq!(
            split_skills(" Rust, ,SQL ,Django"),
            vec!["rust".to_string(), "sql".to_string(), "django".to_string()]
        );
    }
}
