use super::Notification;
use crate::accounts::User;
use crate::applications::Application;
use crate::jobs::Job;

const SIGNATURE: &str = "- Job Portal";

/// Employer alert and applicant confirmation for a new application.
pub fn application_submitted(
    from: &str,
    application: &Application,
    job: &Job,
    employer: &User,
    applicant: &User,
) -> [Notification; 2] {
    let status = application.status.display();

    let to_employer = Notification {
        from: from.to_string(),
        subject: format!("New application for '{}'", job.title),
        body: format!(
            "Hello {employer},\n\n\
             You have received a new application for your job posting:\n\
             Title: {title}\n\
             Applicant: {applicant}\n\
             Status: {status}\n\n\
             Log in to your dashboard to review the application.\n\n\
             {SIGNATURE}",
            employer = employer.username,
            title = job.title,
            applicant = applicant.username,
        ),
        recipients: vec![employer.email.clone()],
    };

    let to_applicant = Notification {
        from: from.to_string(),
        subject: format!("Application received for '{}'", job.title),
        body: format!(
            "Hello {applicant},\n\n\
             We have received your application for the job '{title}' at {company}.\n\
             Current status: {status}.\n\n\
             You can log in to your dashboard at any time to track the progress of your application.\n\n\
             {SIGNATURE}",
            applicant = applicant.username,
            title = job.title,
            company = job.display_company(Some(employer)),
        ),
        recipients: vec![applicant.email.clone()],
    };

    [to_employer, to_applicant]
}

/// Tells the applicant their application moved to a new status.
pub fn status_changed(
    from: &str,
    application: &Application,
    job: &Job,
    applicant: &User,
) -> Notification {
    Notification {
        from: from.to_string(),
        subject: format!("Your application status for '{}' has changed", job.title),
        body: format!(
            "Hello {applicant},\n\n\
             The status of your application for the job '{title}' has been updated.\n\
             New status: {status}\n\n\
             Log in to your dashboard to see more details.\n\n\
             {SIGNATURE}",
            applicant = applicant.username,
            title = job.title,
            status = application.status.display(),
        ),
        recipients: vec![applicant.email.clone()],
    }
}

pub fn welcome(from: &str, user: &User) -> Notification {
    Notification {
        from: from.to_string(),
        subject: "Welcome to Job Portal".to_string(),
        body: format!(
            "Hi {username},\n\n\
             Your account on Job Portal has been created successfully as a '{role}'.\n\n\
             You can now log in and start using the platform:\n\
             - Applicants: browse jobs and apply.\n\
             - Employers: post jobs and manage applications.\n\n\
             Thanks,\nJob Portal Team",
            username = user.username,
            role = user.role,
        ),
        recipients: vec![user.email.clone()],
    }
}
