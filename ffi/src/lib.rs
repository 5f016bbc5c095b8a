//! C-ABI wrapper around the `todo-core` presenter.
//!
//! # Overview
//! Lets a native host (Android, iOS, desktop) drive the todo list screen
//! through `extern "C"` functions: create a presenter, issue load/refresh
//! commands, read or subscribe to `UiState` snapshots, and subscribe to the
//! transient `"Error: ..."` notices. The host never links against Tokio or
//! serde directly.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Each presenter handle owns its own Tokio runtime; loads run there and the
//!   host's calling thread never blocks, except in `todo_presenter_wait_settled`.
//! - Snapshots are deep copies. The caller owns every returned pointer and
//!   must call the matching `todo_free_*` function; snapshots passed to a
//!   subscription callback are borrowed and freed by this library.

pub mod types;

use std::ffi::{c_void, CStr};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::time::Duration;

use todo_core::{ClientConfig, TodosPresenter, UiState};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use types::*;

/// How long `todo_presenter_free` waits for runtime workers to stop.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Presenter lifecycle
// ---------------------------------------------------------------------------

/// Create a presenter bound to `base_url` and issue the startup load.
///
/// `timeout_secs` of 0 leaves timeouts to the HTTP transport.
/// Returns null if `base_url` is null or not UTF-8, if the runtime cannot be
/// started, or if an internal panic occurs.
/// The caller must free the returned pointer with `todo_presenter_free`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_presenter_new(
    base_url: *const c_char,
    timeout_secs: u64,
) -> *mut FfiTodosPresenter {
    catch_unwind(|| {
        if base_url.is_null() {
            return std::ptr::null_mut();
        }
        let Ok(url) = unsafe { CStr::from_ptr(base_url) }.to_str() else {
            return std::ptr::null_mut();
        };
        let config = ClientConfig {
            base_url: url.to_string(),
            timeout_secs: (timeout_secs > 0).then_some(timeout_secs),
        };

        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("todo-ffi")
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(_) => return std::ptr::null_mut(),
        };
        let presenter = {
            let _guard = runtime.enter();
            TodosPresenter::start(todo_core::use_case(&config))
        };
        debug!(base_url = url, "ffi presenter created");

        Box::into_raw(Box::new(FfiTodosPresenter {
            runtime,
            presenter,
            subscription: Default::default(),
            notice_subscription: Default::default(),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a presenter created by `todo_presenter_new`. Drops any subscription
/// and abandons in-flight loads, waiting briefly for runtime workers to stop.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_presenter_free(presenter: *mut FfiTodosPresenter) {
    if presenter.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let handle = unsafe { Box::from_raw(presenter) };
        let FfiTodosPresenter {
            runtime,
            presenter,
            subscription,
            notice_subscription,
        } = *handle;
        for slot in [subscription, notice_subscription] {
            if let Ok(Some(active)) = slot.into_inner() {
                active.cancel();
            }
        }
        drop(presenter);
        runtime.shutdown_timeout(SHUTDOWN_GRACE);
    }));
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Publish `Loading` and start a new load. Returns false if `presenter` is
/// null or an internal panic occurs.
#[unsafe(no_mangle)]
pub extern "C" fn todo_presenter_load(presenter: *const FfiTodosPresenter) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if presenter.is_null() {
            return false;
        }
        let handle = unsafe { &*presenter };
        let _guard = handle.runtime.enter();
        handle.presenter.load_todos();
        true
    }))
    .unwrap_or(false)
}

/// Same as `todo_presenter_load`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_presenter_refresh(presenter: *const FfiTodosPresenter) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if presenter.is_null() {
            return false;
        }
        let handle = unsafe { &*presenter };
        let _guard = handle.runtime.enter();
        handle.presenter.refresh();
        true
    }))
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// State access
// ---------------------------------------------------------------------------

/// Snapshot the current state.
///
/// Returns null if `presenter` is null.
/// The caller must free the returned pointer with `todo_free_ui_state`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_presenter_state(presenter: *const FfiTodosPresenter) -> *mut FfiUiState {
    catch_unwind(AssertUnwindSafe(|| {
        if presenter.is_null() {
            return std::ptr::null_mut();
        }
        let handle = unsafe { &*presenter };
        FfiUiState::from_core(&handle.presenter.state())
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Block the calling thread until the state leaves `Loading` or `timeout_ms`
/// elapses, then snapshot it (the snapshot may still be `Loading` on
/// timeout).
///
/// Must not be called from inside a subscription callback.
/// Returns null if `presenter` is null.
/// The caller must free the returned pointer with `todo_free_ui_state`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_presenter_wait_settled(
    presenter: *const FfiTodosPresenter,
    timeout_ms: u64,
) -> *mut FfiUiState {
    catch_unwind(AssertUnwindSafe(|| {
        if presenter.is_null() {
            return std::ptr::null_mut();
        }
        let handle = unsafe { &*presenter };
        let mut rx = handle.presenter.subscribe();
        let settled = handle.runtime.block_on(async {
            tokio::time::timeout(
                Duration::from_millis(timeout_ms),
                rx.wait_for(|state| !state.is_loading()),
            )
            .await
            .map(|result| result.is_ok())
            .unwrap_or(false)
        });
        debug!(settled, "ffi wait finished");
        FfiUiState::from_core(&handle.presenter.state())
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Invoke `callback` with the current state, then again on every change,
/// from a runtime worker thread. Replaces any earlier subscription on this
/// presenter.
///
/// `user_data` is passed through untouched and must stay valid until
/// `todo_presenter_unsubscribe` or `todo_presenter_free`. After either
/// returns, only a callback already under way may still complete.
/// Returns false if `presenter` or `callback` is null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_presenter_subscribe(
    presenter: *const FfiTodosPresenter,
    callback: Option<FfiStateCallback>,
    user_data: *mut c_void,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if presenter.is_null() {
            return false;
        }
        let Some(callback) = callback else {
            return false;
        };
        let handle = unsafe { &*presenter };
        let mut rx = handle.presenter.subscribe();
        let user_data = UserData::new(user_data);

        let subscription = Subscription::new(|active| {
            handle.runtime.spawn(async move {
                loop {
                    let snapshot = rx.borrow_and_update().clone();
                    if !active.load(Ordering::SeqCst) {
                        break;
                    }
                    deliver(callback, &snapshot, user_data.get());
                    if rx.changed().await.is_err() {
                        break;
                    }
                }
            })
        });
        replace_subscription(&handle.subscription, Some(subscription))
    }))
    .unwrap_or(false)
}

/// Drop the current subscription, if any. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_presenter_unsubscribe(presenter: *const FfiTodosPresenter) {
    if presenter.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let handle = unsafe { &*presenter };
        replace_subscription(&handle.subscription, None);
    }));
}

/// Invoke `callback` with each transient notice (`"Error: <message>"`), one
/// per failed load that reached the screen, from a runtime worker thread.
/// Replaces any earlier notice subscription on this presenter.
///
/// Notices are not replayed: one published before this call is never
/// delivered. The startup load's notice may already be gone; read the
/// `Error` snapshot for it instead.
/// `user_data` must stay valid until `todo_presenter_unsubscribe_notices` or
/// `todo_presenter_free`. Returns false if `presenter` or `callback` is null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_presenter_subscribe_notices(
    presenter: *const FfiTodosPresenter,
    callback: Option<FfiNoticeCallback>,
    user_data: *mut c_void,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if presenter.is_null() {
            return false;
        }
        let Some(callback) = callback else {
            return false;
        };
        let handle = unsafe { &*presenter };
        let mut rx = handle.presenter.notices();
        let user_data = UserData::new(user_data);

        let subscription = Subscription::new(|active| {
            handle.runtime.spawn(async move {
                loop {
                    let notice = match rx.recv().await {
                        Ok(notice) => notice,
                        Err(RecvError::Lagged(skipped)) => {
                            debug!(skipped, "ffi notice subscriber lagged");
                            continue;
                        }
                        Err(RecvError::Closed) => break,
                    };
                    if !active.load(Ordering::SeqCst) {
                        break;
                    }
                    let line = notice_line(&notice);
                    callback(line.as_ptr(), user_data.get());
                }
            })
        });
        replace_subscription(&handle.notice_subscription, Some(subscription))
    }))
    .unwrap_or(false)
}

/// Drop the current notice subscription, if any. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_presenter_unsubscribe_notices(presenter: *const FfiTodosPresenter) {
    if presenter.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let handle = unsafe { &*presenter };
        replace_subscription(&handle.notice_subscription, None);
    }));
}

fn deliver(callback: FfiStateCallback, state: &UiState, user_data: *mut c_void) {
    let snapshot = FfiUiState::from_core(state);
    callback(snapshot, user_data);
    unsafe { FfiUiState::free(snapshot) };
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiUiState` returned by `todo_presenter_state` or
/// `todo_presenter_wait_settled`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_free_ui_state(state: *mut FfiUiState) {
    if state.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiUiState::free(state) });
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
