use crate::api::BufferStatus;
use crate::utils::ERROR_INSUFFICIENT_BUFFER;
use crate::{DeviceError, DeviceResult};
use log::trace;

/// How many times a buffer-filling call is attempted before giving up.
pub const RETRY_ROUNDS: usize = 3;

/// Run a buffer-filling platform call, growing the buffer when it is reported too small.
///
/// The first attempt uses `initial`, so callers can pass a stack buffer and avoid
/// allocating in the common case. When the call reports that `required` elements
/// are needed, a buffer of exactly that size is allocated and the call is repeated,
/// up to [`RETRY_ROUNDS`] attempts in total. Any other error is returned as is.
///
/// On success `decode` receives the call's metadata and the filled part of the buffer.
pub fn retrieve<T, M, R, C, D>(initial: &mut [T], mut call: C, decode: D) -> DeviceResult<R>
where
    T: Clone + Default,
    C: FnMut(&mut [T]) -> DeviceResult<BufferStatus<M>>,
    D: FnOnce(M, &[T]) -> DeviceResult<R>,
{
    let mut grown: Option<Vec<T>> = None;

    for round in 0..RETRY_ROUNDS {
        let buffer: &mut [T] = match grown.as_mut() {
            Some(buffer) => buffer.as_mut_slice(),
            None => &mut *initial,
        };

        match call(buffer)? {
            BufferStatus::Filled { len, meta } => {
                let len = len.min(buffer.len());
                return decode(meta, &buffer[..len]);
            }
            BufferStatus::TooSmall { required } => {
                trace!(
                    "Buffer of {} elements too small on round {}, {} required",
                    buffer.len(),
                    round + 1,
                    required
                );
                grown = Some(vec![T::default(); required]);
            }
        }
    }

    Err(DeviceError::Win32 {
        code: ERROR_INSUFFICIENT_BUFFER,
    })
}
