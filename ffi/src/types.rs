//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, a pointer/length pair instead of `Vec`,
//! and tagged enums with explicit discriminants. Conversion and release live
//! here to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use todo_core::{Notice, TodoItem, TodosPresenter, UiState};

/// Opaque handle to a presenter and the runtime its loads run on. C callers
/// receive a pointer to this and pass it back into every FFI function.
pub struct FfiTodosPresenter {
    pub(crate) runtime: Runtime,
    pub(crate) presenter: TodosPresenter,
    pub(crate) subscription: Mutex<Option<Subscription>>,
    pub(crate) notice_subscription: Mutex<Option<Subscription>>,
}

/// Called with a borrowed state snapshot. The snapshot is freed when the
/// callback returns; copy anything that must outlive the call.
pub type FfiStateCallback = extern "C" fn(state: *const FfiUiState, user_data: *mut c_void);

/// Called with a borrowed, NUL-terminated notice line such as
/// `"Error: connection refused"`. Valid only for the duration of the call.
pub type FfiNoticeCallback = extern "C" fn(message: *const c_char, user_data: *mut c_void);

/// A delivery task plus the flag it checks before every callback.
pub(crate) struct Subscription {
    task: JoinHandle<()>,
    active: Arc<AtomicBool>,
}

impl Subscription {
    /// `spawn` receives the flag and must skip delivery once it reads false.
    pub(crate) fn new(spawn: impl FnOnce(Arc<AtomicBool>) -> JoinHandle<()>) -> Self {
        let active = Arc::new(AtomicBool::new(true));
        let task = spawn(Arc::clone(&active));
        Self { task, active }
    }

    /// Delivery stops at the task's next check of the flag; a callback
    /// already under way finishes.
    pub(crate) fn cancel(self) {
        self.active.store(false, Ordering::SeqCst);
        self.task.abort();
    }
}

/// Cancel whatever subscription `slot` holds and store `next` in its place.
pub(crate) fn replace_subscription(
    slot: &Mutex<Option<Subscription>>,
    next: Option<Subscription>,
) -> bool {
    let Ok(mut guard) = slot.lock() else {
        if let Some(next) = next {
            next.cancel();
        }
        return false;
    };
    let previous = std::mem::replace(&mut *guard, next);
    drop(guard);
    if let Some(previous) = previous {
        previous.cancel();
    }
    true
}

/// Caller-owned context pointer handed back to `FfiStateCallback`.
pub(crate) struct UserData(*mut c_void);

// The pointer is never dereferenced on the Rust side; the C caller promises
// it stays valid until the subscription is dropped.
unsafe impl Send for UserData {}

impl UserData {
    pub(crate) fn new(ptr: *mut c_void) -> Self {
        Self(ptr)
    }

    pub(crate) fn get(&self) -> *mut c_void {
        self.0
    }
}

// ---------------------------------------------------------------------------
// State snapshot
// ---------------------------------------------------------------------------

/// Which `UiState` variant a snapshot holds.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiUiStateTag {
    Loading = 0,
    Success = 1,
    Error = 2,
}

/// A single todo item exposed to C.
#[repr(C)]
pub struct FfiTodoItem {
    pub id: i64,
    pub user_id: i64,
    pub title: *mut c_char,
    pub completed: bool,
}

/// A `UiState` snapshot.
///
/// `items`/`items_len` are set only for `Success` (null/0 for an empty list);
/// `error_message` only for `Error`. Free with `todo_free_ui_state`.
#[repr(C)]
pub struct FfiUiState {
    pub tag: FfiUiStateTag,
    pub items: *mut FfiTodoItem,
    pub items_len: usize,
    pub error_message: *mut c_char,
}

impl FfiUiState {
    /// Copy a core `UiState` into a heap-allocated `FfiUiState`.
    pub(crate) fn from_core(state: &UiState) -> *mut Self {
        let snapshot = match state {
            UiState::Loading => FfiUiState {
                tag: FfiUiStateTag::Loading,
                items: std::ptr::null_mut(),
                items_len: 0,
                error_message: std::ptr::null_mut(),
            },
            UiState::Success(items) => {
                let (items, items_len) = items_to_raw(items);
                FfiUiState {
                    tag: FfiUiStateTag::Success,
                    items,
                    items_len,
                    error_message: std::ptr::null_mut(),
                }
            }
            UiState::Error(message) => FfiUiState {
                tag: FfiUiStateTag::Error,
                items: std::ptr::null_mut(),
                items_len: 0,
                error_message: c_string(message),
            },
        };
        Box::into_raw(Box::new(snapshot))
    }

    /// Release a snapshot produced by `from_core`.
    ///
    /// # Safety
    /// `ptr` must be null or come from `from_core`, and must not be used
    /// afterwards.
    pub(crate) unsafe fn free(ptr: *mut Self) {
        if ptr.is_null() {
            return;
        }
        let state = unsafe { Box::from_raw(ptr) };
        if !state.error_message.is_null() {
            drop(unsafe { CString::from_raw(state.error_message) });
        }
        if !state.items.is_null() && state.items_len > 0 {
            let slice = std::ptr::slice_from_raw_parts_mut(state.items, state.items_len);
            let items = unsafe { Box::from_raw(slice) };
            for item in items.iter() {
                if !item.title.is_null() {
                    drop(unsafe { CString::from_raw(item.title) });
                }
            }
        }
    }
}

/// The notice as the host shows it, e.g. `"Error: timed out"`.
pub(crate) fn notice_line(notice: &Notice) -> CString {
    CString::new(notice.to_string().replace('\0', "")).unwrap_or_default()
}

fn items_to_raw(items: &[TodoItem]) -> (*mut FfiTodoItem, usize) {
    if items.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let boxed: Box<[FfiTodoItem]> = items
        .iter()
        .map(|item| FfiTodoItem {
            id: item.id,
            user_id: item.user_id,
            title: c_string(&item.title),
            completed: item.completed,
        })
        .collect();
    let len = boxed.len();
    (Box::into_raw(boxed) as *mut FfiTodoItem, len)
}

/// Interior NULs cannot cross into C; they are dropped.
fn c_string(s: &str) -> *mut c_char {
    CString::new(s.replace('\0', ""))
        .unwrap_or_default()
        .into_raw()
}
