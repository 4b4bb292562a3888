//! Infrastructure layer: persistence, filesystem, trainer and services

pub mod dataset;
pub mod fingerprint;
pub mod logging;
pub mod materializer;
pub mod model;
pub mod project;
pub mod services;
pub mod storage;
pub mod trainer;
pub mod training;
