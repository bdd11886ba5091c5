/*!
 * Native Threads
 *
 * Thin owner of a pthread created with explicit attributes. `std::thread`
 * cannot take a `pthread_attr_t`, so creation and join go through libc
 * directly. The closure result (or its panic payload) travels back through
 * the pthread exit value.
 */

use super::attr::NativeAttr;
use nix::errno::Errno;
use nix::libc;
use std::ffi::{c_void, CStr, CString};
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::{mem, ptr, thread};
use tracing::warn;

type ThreadMain<T> = Box<dyn FnOnce() -> T + Send + 'static>;

/// Longest thread name Linux stores, excluding the terminator
const THREAD_NAME_MAX: usize = 15;

/// A running or finished native thread producing a `T`
///
/// Dropping it without `join` detaches the thread.
pub struct NativeThread<T> {
    id: libc::pthread_t,
    joined: bool,
    _result: PhantomData<fn() -> T>,
}

/// Create a thread with `attr` running `f`
pub fn spawn<T, F>(attr: &NativeAttr, f: F) -> Result<NativeThread<T>, Errno>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let main: Box<ThreadMain<T>> = Box::new(Box::new(f));
    let arg = Box::into_raw(main) as *mut c_void;

    // SAFETY: pthread_t is plain data and is written by pthread_create.
    let mut id: libc::pthread_t = unsafe { mem::zeroed() };
    let rc = unsafe { libc::pthread_create(&mut id, attr.as_ptr(), trampoline::<T>, arg) };
    if rc != 0 {
        // SAFETY: no thread was created, so `arg` is still ours.
        drop(unsafe { Box::from_raw(arg as *mut ThreadMain<T>) });
        return Err(Errno::from_raw(rc));
    }

    Ok(NativeThread {
        id,
        joined: false,
        _result: PhantomData,
    })
}

extern "C" fn trampoline<T: Send + 'static>(arg: *mut c_void) -> *mut c_void {
    // SAFETY: `arg` came from Box::into_raw in `spawn` and is consumed once.
    let main = unsafe { Box::from_raw(arg as *mut ThreadMain<T>) };
    // Unwinding must not cross the C frame
    let result: thread::Result<T> = panic::catch_unwind(AssertUnwindSafe(move || main()));
    Box::into_raw(Box::new(result)) as *mut c_void
}

impl<T> NativeThread<T> {
    /// Raw pthread identifier
    pub fn id(&self) -> u64 {
        self.id as u64
    }

    /// Wait for the thread and take its result
    ///
    /// The inner `Err` carries the panic payload if the closure panicked.
    pub fn join(mut self) -> Result<thread::Result<T>, Errno> {
        let mut ret: *mut c_void = ptr::null_mut();
        let rc = unsafe { libc::pthread_join(self.id, &mut ret) };
        self.joined = true;
        if rc != 0 {
            return Err(Errno::from_raw(rc));
        }

        // SAFETY: every thread we create exits through `trampoline::<T>`.
        let result = unsafe { Box::from_raw(ret as *mut thread::Result<T>) };
        Ok(*result)
    }
}

/// Name the calling thread as seen by the OS (`ps -L`, `top -H`, debuggers)
///
/// Names longer than the kernel limit are truncated. Failure only logs.
pub fn name_current_thread(name: &str) {
    let mut end = name.len().min(THREAD_NAME_MAX);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    let Ok(cname) = CString::new(&name[..end]) else {
        warn!(name, "Thread name contains a NUL byte, not set");
        return;
    };

    let rc = unsafe { libc::pthread_setname_np(libc::pthread_self(), cname.as_ptr()) };
    if rc != 0 {
        warn!(name, error = %Errno::from_raw(rc), "pthread_setname_np failed");
    }
}

/// OS name of the calling thread
pub fn current_thread_name() -> Result<String, Errno> {
    let mut buf = [0 as libc::c_char; THREAD_NAME_MAX + 1];
    let rc = unsafe { libc::pthread_getname_np(libc::pthread_self(), buf.as_mut_ptr(), buf.len()) };
    if rc != 0 {
        return Err(Errno::from_raw(rc));
    }
    // SAFETY: on success the buffer holds a NUL-terminated string.
    let name = unsafe { CStr::from_ptr(buf.as_ptr()) };
    Ok(name.to_string_lossy().into_owned())
}

impl<T> Drop for NativeThread<T> {
    fn drop(&mut self) {
        if self.joined {
            return;
        }
        let rc = unsafe { libc::pthread_detach(self.id) };
        if rc != 0 {
            warn!(thread = self.id as u64, error = %Errno::from_raw(rc), "pthread_detach failed");
        }
    }
}

impl<T> std::fmt::Debug for NativeThread<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeThread")
            .field("id", &self.id)
            .field("joined", &self.joined)
            .finish()
    }
}
