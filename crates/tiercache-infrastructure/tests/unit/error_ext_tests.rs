//! Error Extension Tests

use std::io;
use tiercache_domain::error::Error;
use tiercache_infrastructure::error_ext::{ErrorContext, either_tier};

fn io_failure() -> Result<(), io::Error> {
    Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
}

#[test]
fn test_context_maps_to_backend() {
    let err = io_failure().context("Redis handshake").unwrap_err();
    assert!(matches!(err, Error::Backend { .. }));
    assert!(err.to_string().contains("Redis handshake: denied"));
}

#[test]
fn test_with_context_is_lazy() {
    let ok: Result<u8, io::Error> = Ok(1);
    let value = ok
        .with_context(|| -> String { panic!("context built for a success") })
        .unwrap();
    assert_eq!(value, 1);
}

#[test]
fn test_typed_contexts() {
    assert!(matches!(
        io_failure().io_context("write").unwrap_err(),
        Error::Io { .. }
    ));
    assert!(matches!(
        io_failure().config_context("load").unwrap_err(),
        Error::Configuration { .. }
    ));
    assert!(matches!(
        io_failure().codec_context("decode").unwrap_err(),
        Error::Invalid { .. }
    ));
}

#[test]
fn test_context_keeps_source() {
    let err = io_failure().io_context("write").unwrap_err();
    let source = std::error::Error::source(&err).expect("source preserved");
    assert_eq!(source.to_string(), "denied");
}

#[test]
fn test_either_tier_combines_failures() {
    let err = either_tier(Err(Error::backend("p")), Some(Err(Error::not_found("k")))).unwrap_err();
    assert!(err.to_string().contains("primary: Backend error: p"));
    assert!(err.to_string().contains("secondary: Key not found: k"));
}
