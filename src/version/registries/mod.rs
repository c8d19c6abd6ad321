//! Registry implementations for fetching image tags

pub mod docker_hub;

pub use docker_hub::DockerHubRegistry;
