//! Public-holiday calendar computation.

mod holidays;

pub use holidays::{
    DEFAULT_REGION, Holiday, easter_sunday, holidays_for_year, is_public_holiday,
};
