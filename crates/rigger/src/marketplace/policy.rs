use super::domain::{Actor, UserRole, UserStatus};

/// Operations guarded by the access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateJob,
    UpdateJob,
    DeleteJob,
    SubmitApplication,
    ReviewApplication,
    WithdrawApplication,
    ViewApplication,
    ListJobApplications,
    ListOwnApplications,
}

impl Action {
    pub const fn describe(self) -> &'static str {
        match self {
            Self::CreateJob => "post jobs",
            Self::UpdateJob => "update this job",
            Self::DeleteJob => "delete this job",
            Self::SubmitApplication => "apply for this job",
            Self::ReviewApplication => "review this application",
            Self::WithdrawApplication => "withdraw this application",
            Self::ViewApplication => "view this application",
            Self::ListJobApplications => "list applications for this job",
            Self::ListOwnApplications => "list applications",
        }
    }
}

/// How the actor relates to the resource being acted on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ownership {
    pub is_job_poster: bool,
    pub is_applicant: bool,
}

impl Ownership {
    pub const NONE: Self = Self {
        is_job_poster: false,
        is_applicant: false,
    };

    pub const fn poster(is_job_poster: bool) -> Self {
        Self {
            is_job_poster,
            is_applicant: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub const fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Single permission table for every guarded operation.
pub fn authorize(actor: &Actor, action: Action, ownership: Ownership) -> Decision {
    if actor.status != UserStatus::Active {
        return Decision::Deny;
    }

    let role = actor.role;
    let delegated_reviewer = matches!(role, UserRole::Admin | UserRole::SafetyOfficer);

    let allowed = match action {
        Action::CreateJob => matches!(role, UserRole::Employer | UserRole::Admin),
        Action::UpdateJob | Action::DeleteJob => {
            role == UserRole::Admin || (role == UserRole::Employer && ownership.is_job_poster)
        }
        Action::SubmitApplication => role == UserRole::Worker && !ownership.is_job_poster,
        Action::ReviewApplication | Action::ListJobApplications => {
            delegated_reviewer || ownership.is_job_poster
        }
        Action::WithdrawApplication => ownership.is_applicant,
        Action::ViewApplication => {
            ownership.is_applicant || ownership.is_job_poster || delegated_reviewer
        }
        Action::ListOwnApplications => true,
    };

    if allowed {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: UserRole) -> Actor {
        Actor::new("user-1", role)
    }

    #[test]
    fn only_employers_and_admins_post_jobs() {
        let may_post =
            |role| authorize(&actor(role), Action::CreateJob, Ownership::NONE).is_allowed();
        assert!(may_post(UserRole::Employer));
        assert!(may_post(UserRole::Admin));
        assert!(!may_post(UserRole::Worker));
        assert!(!may_post(UserRole::SafetyOfficer));
    }

    #[test]
    fn reviews_require_poster_or_delegate() {
        let employer = actor(UserRole::Employer);
        assert!(
            !authorize(&employer, Action::ReviewApplication, Ownership::NONE).is_allowed(),
            "employers cannot review other posters' jobs"
        );
        assert!(
            authorize(&employer, Action::ReviewApplication, Ownership::poster(true)).is_allowed()
        );
        assert!(authorize(
            &actor(UserRole::SafetyOfficer),
            Action::ReviewApplication,
            Ownership::NONE
        )
        .is_allowed());
    }

    #[test]
    fn withdrawal_is_applicant_only() {
        let own = Ownership {
            is_job_poster: false,
            is_applicant: true,
        };
        assert!(authorize(&actor(UserRole::Worker), Action::WithdrawApplication, own).is_allowed());
        assert!(!authorize(
            &actor(UserRole::Admin),
            Action::WithdrawApplication,
            Ownership::NONE
        )
        .is_allowed());
    }

    #[test]
    fn suspended_users_are_denied_everything() {
        let mut worker = actor(UserRole::Worker);
        worker.status = UserStatus::Suspended;
        assert_eq!(
            authorize(&worker, Action::SubmitApplication, Ownership::NONE),
            Decision::Deny
        );
    }
}
