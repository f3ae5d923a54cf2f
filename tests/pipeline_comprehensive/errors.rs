//! Error Handling Tests
//!
//! Tests for:
//! - Timeout on unset cells
//! - Cancellation
//! - Stage errors propagating from the triggering call
//! - Stage errors crossing a splice

use crate::*;
use std::time::Duration;

#[test]
fn test_result_on_unset_cell_times_out() {
    let cell: PipedFuture<i64> = PipedFuture::new();
    cell.add_done_callback(inc).unwrap();

    let err = cell.result(Some(Duration::from_millis(20))).unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }));
    assert!(err.is_retryable());

    // still usable after a timeout
    cell.set_result(1).unwrap();
    assert_eq!(cell.result(Some(Duration::from_millis(20))).unwrap(), 2);
}

#[test]
fn test_unbounded_timeout_does_not_overflow() {
    let cell: PipedFuture<i64> = PipedFuture::new();
    cell.add_done_callback(inc).unwrap();

    let reader = {
        let cell = cell.clone();
        std::thread::spawn(move || cell.result(Some(Duration::MAX)))
    };
    std::thread::sleep(Duration::from_millis(20));
    cell.set_result(1).unwrap();

    assert!(reader.join().unwrap().is_ok());
    assert_eq!(cell.result(Some(Duration::MAX)).unwrap(), 2);
}

#[test]
fn test_wait_honours_builder_timeout() {
    let cell: PipedFuture<i64> = FutureBuilder::new()
        .default_timeout(Duration::from_millis(10))
        .piped();
    assert!(cell.wait().unwrap_err().is_timeout());
}

#[test]
fn test_result_on_cancelled_cell() {
    let cell: PipedFuture<i64> = PipedFuture::new();
    assert!(cell.cancel());
    assert!(cell.done());
    assert!(matches!(cell.result(None).unwrap_err(), Error::Cancelled));
}

#[test]
fn test_assign_cancelled_cell_is_invalid_state() {
    let cell: PipedFuture<i64> = PipedFuture::new();
    cell.cancel();
    let err = cell.set_result(1).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidState {
            state: FutureState::Cancelled,
            ..
        }
    ));
}

#[test]
fn test_cancel_refused_after_finish() {
    let cell = PipedFuture::new();
    cell.set_result(1i64).unwrap();
    assert!(!cell.cancel());
    assert_eq!(cell.result(None).unwrap(), 1);
}

#[test]
fn test_stage_error_surfaces_from_set_result() {
    let log = new_log();
    let cell = named("failing");
    cell.add_done_callback(logged_inc(&log)).unwrap();
    cell.add_done_callback(|f: &PipedFuture<i64>| {
        let v = f.result(None)?;
        if v > 1 {
            return Err(Error::callback(format!("value {} too large", v)));
        }
        Ok(v)
    })
    .unwrap();
    cell.add_done_callback(logged_inc(&log)).unwrap();

    let err = cell.set_result(1).unwrap_err();
    assert_eq!(err.to_string(), "callback failed: value 2 too large");
    // first stage committed, the rest did not run
    assert_eq!(cell.result(None).unwrap(), 2);
    assert_eq!(log.lock().len(), 1);
}

#[test]
fn test_stage_error_does_not_poison_cell() {
    let cell = PipedFuture::new();
    cell.add_done_callback(|f: &PipedFuture<i64>| {
        let v = f.result(None)?;
        if v < 0 {
            Err(Error::callback("negative"))
        } else {
            Ok(v * 2)
        }
    })
    .unwrap();

    assert!(cell.set_result(-1).is_err());
    assert_eq!(cell.result(None).unwrap(), -1);

    cell.set_result(4).unwrap();
    assert_eq!(cell.result(None).unwrap(), 8);
}

#[test]
fn test_dependency_error_propagates_to_host() {
    let embedded = PipedFuture::new();
    embedded
        .add_done_callback(|_: &PipedFuture<i64>| Err(Error::callback("embedded broke")))
        .unwrap();

    let host = PipedFuture::new();
    host.add_done_callback(add(1)).unwrap();
    host.add_done_future(embedded.clone()).unwrap();
    host.add_done_callback(add(1)).unwrap();

    let err = host.set_result(0).unwrap_err();
    assert!(err.is_callback());
    assert_eq!(host.result(None).unwrap(), 1);
    // dependency got its value even though its pipeline failed
    assert_eq!(embedded.result(None).unwrap(), 1);
}

#[test]
fn test_failing_promise_callback_is_logged_not_raised() {
    init_tracing();
    let promise: Promise<i64> = FutureBuilder::new().description("noisy").promise();
    promise.add_done_callback(|_| Err(Error::callback("ignored")));

    promise.set_result(5).unwrap();
    assert_eq!(promise.result(None).unwrap(), 5);
    assert_eq!(promise.metrics().stages_failed, 1);
}
