#![doc = "tunnel-link-core: core logic library for tunnel-link."]

//! This crate holds everything tunnel-link does apart from terminal I/O:
//! reading the tunnel log, editing the local manifest, talking to the remote
//! contents API and sequencing those steps.
//!
//! # Usage
//! Build an [`config::UpdateConfig`], pick a [`contract::ContentApi`]
//! (normally [`github::GitHubClient`]) and a [`contract::Prompter`], then call
//! [`update::update_link`].

pub mod config;
pub mod contract;
pub mod credential;
pub mod github;
pub mod manifest;
pub mod publish;
pub mod scanner;
pub mod update;
