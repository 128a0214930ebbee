//! Job board for rigging and lifting work: postings, search, and the
//! worker application workflow.

pub mod domain;
pub mod error;
pub mod events;
pub mod identity;
pub mod lifecycle;
pub mod memory;
pub mod policy;
pub mod router;
pub mod search;
pub mod service;
pub mod store;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    Actor, Address, ApplicationId, ApplicationStatus, Coordinates, Job, JobApplication, JobId,
    JobStatus, JobType, PayType, UrgencyLevel, User, UserId, UserRole, UserStatus, WireCode,
};
pub use error::MarketplaceError;
pub use events::{EventPublisher, MarketplaceEvent, PublishError};
pub use lifecycle::InvalidTransition;
pub use memory::InMemoryJobStore;
pub use router::marketplace_router;
pub use search::{
    JobSearchBody, JobSearchFilters, JobSearchQuery, JobSearchResult, JobSummary, LocationFilter,
    Page, PageLimits, PageRequest, PayRange,
};
pub use service::{ApplicationTransition, MarketplaceService};
pub use store::{Acceptance, JobStore, StoreError};
pub use validation::{
    CreateApplicationRequest, CreateJobRequest, FieldError, UpdateApplicationStatusRequest,
    UpdateJobRequest, ValidationErrors,
};
