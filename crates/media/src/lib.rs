//! Hosted media operations: upload an image (optionally recording its URL on
//! a persisted record), delete an asset, recover an asset's public id from
//! its URL, and generate labeled campaign placeholders.
//!
//! The remote side is abstracted behind [`MediaHost`]; [`CloudinaryHost`] is
//! the production implementation. [`MediaService`] sequences host calls and
//! record updates without retries or rollback.

pub mod asset;
pub mod cloudinary;
pub mod error;
pub mod host;
pub mod image_ops;
pub mod placeholder;
pub mod public_id;
pub mod service;
pub mod signature;

pub use {
    asset::{Asset, DeletionResult, PersistedUpload, UploadRequest, UploadResponse, UploadSource},
    cloudinary::CloudinaryHost,
    error::{Error, HostError, Result},
    host::MediaHost,
    placeholder::placeholder_public_id,
    public_id::extract_public_id,
    service::MediaService,
};
