pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;
pub mod presentation;
pub mod prettyprint;
