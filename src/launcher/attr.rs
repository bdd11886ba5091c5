/*!
 * Scheduling Attributes
 *
 * `SchedulingAttributes` is the plain description of how one thread is
 * created; `NativeAttr` is the initialized `pthread_attr_t` built from it.
 * One `NativeAttr` exists per thread and is destroyed when dropped, after
 * the thread has been created.
 */

use super::affinity::AffinityConfig;
use crate::core::{DemoError, DemoResult};
use crate::scheduler::{SchedPolicy, ThreadSpec};
use nix::errno::Errno;
use nix::libc;
use std::mem;
use tracing::warn;

/// Where a thread takes its scheduling from
///
/// Workers never inherit the creator's policy; only the explicit mode exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InheritMode {
    /// Use the policy and priority in the attributes
    Explicit,
}

impl InheritMode {
    #[inline]
    pub const fn native(&self) -> libc::c_int {
        match self {
            Self::Explicit => libc::PTHREAD_EXPLICIT_SCHED,
        }
    }
}

/// Creation-time scheduling settings for one thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulingAttributes {
    pub policy: SchedPolicy,
    pub priority: i32,
    pub inherit: InheritMode,
    /// Applied by the worker itself before it reaches the start barrier
    pub cpu: Option<usize>,
}

impl SchedulingAttributes {
    /// Attributes for `spec`; inheritance is always explicit
    pub fn for_spec(spec: &ThreadSpec, affinity: &AffinityConfig) -> Self {
        Self {
            policy: spec.policy,
            priority: spec.priority,
            inherit: InheritMode::Explicit,
            cpu: affinity.cpu_for(spec.index),
        }
    }
}

/// Owned, initialized `pthread_attr_t`
///
/// Boxed so the attribute object never moves after `pthread_attr_init`.
pub struct NativeAttr {
    raw: Box<libc::pthread_attr_t>,
}

impl NativeAttr {
    /// Initialize a native attribute object and apply `attrs` to it
    pub fn build(attrs: &SchedulingAttributes) -> DemoResult<Self> {
        // SAFETY: pthread_attr_t is plain data; pthread_attr_init overwrites it.
        let mut raw: Box<libc::pthread_attr_t> = Box::new(unsafe { mem::zeroed() });
        check("pthread_attr_init", unsafe {
            libc::pthread_attr_init(&mut *raw)
        })?;

        // From here on Drop destroys the object, including on early return
        let mut attr = Self { raw };

        check("pthread_attr_setinheritsched", unsafe {
            libc::pthread_attr_setinheritsched(&mut *attr.raw, attrs.inherit.native())
        })?;
        check("pthread_attr_setschedpolicy", unsafe {
            libc::pthread_attr_setschedpolicy(&mut *attr.raw, attrs.policy.native())
        })?;

        // SAFETY: zeroed sched_param is valid; some libcs carry extra fields.
        let mut param: libc::sched_param = unsafe { mem::zeroed() };
        param.sched_priority = attrs.priority;
        check("pthread_attr_setschedparam", unsafe {
            libc::pthread_attr_setschedparam(&mut *attr.raw, &param)
        })?;

        Ok(attr)
    }

    pub(crate) fn as_ptr(&self) -> *const libc::pthread_attr_t {
        &*self.raw
    }

    /// Inheritance mode as stored in the native object
    pub fn inherit_sched(&self) -> DemoResult<libc::c_int> {
        let mut value: libc::c_int = 0;
        check("pthread_attr_getinheritsched", unsafe {
            libc::pthread_attr_getinheritsched(self.as_ptr(), &mut value)
        })?;
        Ok(value)
    }

    /// Policy as stored in the native object
    pub fn sched_policy(&self) -> DemoResult<libc::c_int> {
        let mut value: libc::c_int = 0;
        check("pthread_attr_getschedpolicy", unsafe {
            libc::pthread_attr_getschedpolicy(self.as_ptr(), &mut value)
        })?;
        Ok(value)
    }

    /// Priority as stored in the native object
    pub fn sched_priority(&self) -> DemoResult<i32> {
        // SAFETY: overwritten by the call below.
        let mut param: libc::sched_param = unsafe { mem::zeroed() };
        check("pthread_attr_getschedparam", unsafe {
            libc::pthread_attr_getschedparam(self.as_ptr(), &mut param)
        })?;
        Ok(param.sched_priority)
    }
}

impl Drop for NativeAttr {
    fn drop(&mut self) {
        let rc = unsafe { libc::pthread_attr_destroy(&mut *self.raw) };
        if rc != 0 {
            warn!(error = %Errno::from_raw(rc), "pthread_attr_destroy failed");
        }
    }
}

/// pthread calls return the error number instead of setting errno
#[inline]
fn check(operation: &'static str, rc: libc::c_int) -> DemoResult<()> {
    if rc == 0 {
        Ok(())
    } else {
        Err(DemoError::os(operation, Errno::from_raw(rc)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launcher::affinity::PinScope;

    fn spec(policy: SchedPolicy, priority: i32) -> ThreadSpec {
        ThreadSpec {
            index: 1,
            policy,
            priority,
        }
    }

    #[test]
    fn test_attributes_for_spec() {
        let attrs = SchedulingAttributes::for_spec(
            &spec(SchedPolicy::RealtimeFifo, 10),
            &AffinityConfig::pinned(0, PinScope::First),
        );
        assert_eq!(attrs.inherit, InheritMode::Explicit);
        assert_eq!(attrs.inherit.native(), libc::PTHREAD_EXPLICIT_SCHED);
        assert_eq!(attrs.priority, 10);
        assert_eq!(attrs.cpu, None);
    }

    #[test]
    fn test_native_attr_round_trip_fifo() {
        let attrs = SchedulingAttributes::for_spec(
            &spec(SchedPolicy::RealtimeFifo, 30),
            &AffinityConfig::floating(),
        );
        let native = NativeAttr::build(&attrs).unwrap();

        assert_eq!(native.inherit_sched().unwrap(), libc::PTHREAD_EXPLICIT_SCHED);
        assert_eq!(native.sched_policy().unwrap(), libc::SCHED_FIFO);
        assert_eq!(native.sched_priority().unwrap(), 30);
    }

    #[test]
    fn test_native_attr_normal() {
        let attrs =
            SchedulingAttributes::for_spec(&spec(SchedPolicy::Normal, 0), &AffinityConfig::floating());
        let native = NativeAttr::build(&attrs).unwrap();
        assert_eq!(native.sched_policy().unwrap(), libc::SCHED_OTHER);
        assert_eq!(native.sched_priority().unwrap(), 0);
    }
}
