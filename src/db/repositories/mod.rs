pub mod assessments;
pub mod frames;
pub mod graphs;
pub mod profiles;
pub mod sessions;
pub mod users;
