pub mod calendar;
pub mod catalog;
pub mod cost;
pub mod model;
pub mod period;
pub mod planner;
pub mod solver;
pub mod utility;
