//! Credit normalizers
//!
//! Turn raw provider credit lists into the canonical role model:
//! - [`credits`] - a title's cast + crew → one [`NormalizedPersonRole`](crate::model::NormalizedPersonRole) per person
//! - [`person_credits`] - a person's movie + TV credits → one [`NormalizedTitleRole`](crate::model::NormalizedTitleRole) per title
//!
//! Both sort by descending popularity and keep first-appearance order on ties.

pub mod credits;
pub mod person_credits;

pub use credits::normalize_title_credits;
pub use person_credits::normalize_person_credits;
