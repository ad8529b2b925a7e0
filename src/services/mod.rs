mod db_service;

pub use db_service::{DbService, Registration, TaskCreation};
