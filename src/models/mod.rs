//! Domain models.

mod petition;
mod subscriber;

pub use petition::{
    Petition, PetitionDetail, PetitionListing, PetitionStatus, ScrapeRequest, SortOrder,
};
pub use subscriber::Subscriber;
