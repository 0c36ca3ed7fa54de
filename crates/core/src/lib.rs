pub mod classifier;
pub mod config;
pub mod converter;
pub mod discovery;
pub mod error;
pub mod metadata;
pub mod persist;
pub mod pipeline;
pub mod testing;

pub use classifier::{classify_bytes, classify_file, read_signature, Classification};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, DiscoveryMode, SanitizedConfig,
};
pub use converter::{Converter, ConverterError, JpegConverter};
pub use discovery::{
    AssetLocation, CandidateAsset, CandidateListing, ContentDiscovery, DiscoveryError,
    LocalStoreDiscovery, RemoteProbeDiscovery, StoreLocator,
};
pub use error::FailureKind;
pub use metadata::{GraphqlMetadataClient, MetadataClient, MetadataError, Record};
pub use persist::{EmbeddedPersister, PathPersister, PersistError, ScreenshotPersister};
pub use pipeline::{
    Pipeline, PipelineConfig, PipelineError, RunOutcome, RunReport, RunStats, Strategy,
};
