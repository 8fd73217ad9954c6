pub mod check;
pub mod clean;
pub mod run;
