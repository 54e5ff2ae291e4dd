//! C API for the Just Voice noise reduction engine.
//!
//! The exported functions follow `include/just_voice.h`. Every function
//! returns a status code, `0` on success and a [`JvError`] code otherwise.
//!
//! A handle is an opaque pointer owned by the caller. [`JV_CREATE`] fills an
//! empty (null) slot and [`JV_DESTROY`] frees the engine and nulls the slot
//! again, so a destroyed handle reports `JV_NOT_CREATED` on further use.

#![allow(non_snake_case)]

use just_voice::{Config, Engine, JvError, ParameterContext, Params, code_from_result};
use std::{cell::UnsafeCell, ffi::c_char, sync::OnceLock};

/// Opaque engine handle handed out to C callers.
///
/// The engine is only touched by the thread driving [`JV_SETUP`] and
/// [`JV_PROCESS`]. Control threads calling [`JV_UPDATE`] or
/// [`JV_GET_LATENCY`] only reach `context`, which is set once by a successful
/// setup and never borrows the engine.
pub struct JvHandle {
    engine: UnsafeCell<Engine>,
    context: OnceLock<ParameterContext>,
}

impl JvHandle {
    fn context(&self) -> Result<&ParameterContext, JvError> {
        self.context.get().ok_or(JvError::NotInitialized)
    }
}

/// Stream configuration, laid out as `just_voice_config_t`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JvConfig {
    pub num_input_channels: u32,
    pub num_output_channels: u32,
    pub sample_rate: u32,
    pub samples_per_block: u32,
}

/// Processing parameters, laid out as `just_voice_params_t`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JvParams {
    pub noise_reduction_intensity: f32,
}

impl From<JvConfig> for Config {
    fn from(config: JvConfig) -> Self {
        Config {
            num_input_channels: config.num_input_channels,
            num_output_channels: config.num_output_channels,
            sample_rate: config.sample_rate,
            samples_per_block: config.samples_per_block,
        }
    }
}

impl From<JvParams> for Params {
    fn from(params: JvParams) -> Self {
        Params::new(params.noise_reduction_intensity)
    }
}

static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");

/// Borrows a handle, treating null as a handle that was never created.
///
/// # Safety
/// `handle` must be null or a pointer returned by [`JV_CREATE`] that has not been destroyed.
unsafe fn handle_ref<'a>(handle: *const JvHandle) -> Result<&'a JvHandle, JvError> {
    // SAFETY:
    // - The caller guarantees `handle` is null or points to a live `JvHandle`.
    // - A shared reference leaves the engine cell free for the processing thread.
    unsafe { handle.as_ref() }.ok_or(JvError::NotCreated)
}

/// Number of floats in an interleaved buffer of `length` samples per channel.
///
/// Lengths whose byte size does not fit in `isize` are rejected.
fn buffer_len(length: u32, num_channels: u32) -> Result<usize, JvError> {
    (length as usize)
        .checked_mul(num_channels as usize)
        .filter(|&len| len <= isize::MAX as usize / size_of::<f32>())
        .ok_or(JvError::NotSupportedSamplesPerBlock)
}

/// Writes a pointer to the NUL-terminated library version into `version`.
///
/// # Safety
/// `version` must be null or valid for a pointer write.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn JV_GET_VERSION(version: *mut *const c_char) -> i32 {
    if version.is_null() {
        return JvError::NullException.code();
    }
    // SAFETY:
    // - `version` is non-null and the caller guarantees it is writable.
    // - `VERSION` is a NUL-terminated static string.
    unsafe { *version = VERSION.as_ptr().cast() };
    just_voice::SUCCESS
}

/// Creates an engine and stores its handle in `*handle`.
///
/// `*handle` must be null on entry; a non-null value is taken as an already
/// created handle and left untouched. Running out of memory while creating
/// the handle aborts the process like any other Rust allocation, so
/// `JV_ALLOCATION_FAILED` is only reported by [`JV_SETUP`].
///
/// # Safety
/// `handle` must be null or valid for reads and writes of one pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn JV_CREATE(handle: *mut *mut JvHandle) -> i32 {
    // SAFETY:
    // - The caller guarantees `handle` is null or a valid slot.
    let Some(slot) = (unsafe { handle.as_mut() }) else {
        return JvError::NullException.code();
    };
    if !slot.is_null() {
        return JvError::AlreadyCreated.code();
    }

    let result = Engine::create().map(|engine| {
        *slot = Box::into_raw(Box::new(JvHandle {
            engine: UnsafeCell::new(engine),
            context: OnceLock::new(),
        }));
    });
    code_from_result(&result)
}

/// Frees the engine in `*handle` and sets `*handle` to null.
///
/// # Safety
/// `handle` must be null or valid for reads and writes of one pointer, and
/// `*handle` must be null or a pointer returned by [`JV_CREATE`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn JV_DESTROY(handle: *mut *mut JvHandle) -> i32 {
    // SAFETY:
    // - The caller guarantees `handle` is null or a valid slot.
    let Some(slot) = (unsafe { handle.as_mut() }) else {
        return JvError::NullException.code();
    };
    if slot.is_null() {
        return JvError::NotCreated.code();
    }

    // SAFETY:
    // - `*slot` was produced by `Box::into_raw` in `JV_CREATE` and is nulled
    //   below, so it is freed exactly once.
    drop(unsafe { Box::from_raw(*slot) });
    *slot = std::ptr::null_mut();
    just_voice::SUCCESS
}

/// Binds the stream configuration and the initial parameters.
///
/// # Safety
/// `handle` must be null or a live handle that no other thread is setting up
/// or processing. `config` and `params` must be null or point to valid structs.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn JV_SETUP(
    handle: *mut JvHandle,
    config: *const JvConfig,
    params: *const JvParams,
) -> i32 {
    let result = (|| -> Result<(), JvError> {
        // SAFETY:
        // - The caller guarantees `handle` is null or a live handle.
        let handle = unsafe { handle_ref(handle) }?;
        // SAFETY:
        // - The caller guarantees both pointers are null or point to valid structs.
        let (config, params) = unsafe { (config.as_ref(), params.as_ref()) };
        let (Some(config), Some(params)) = (config, params) else {
            return Err(JvError::NullException);
        };

        // SAFETY:
        // - Setup and process are never run concurrently on one handle, so this
        //   is the only reference into the engine cell.
        let engine = unsafe { &mut *handle.engine.get() };
        engine.setup(&Config::from(*config), &Params::from(*params))?;
        handle
            .context
            .set(engine.parameter_context()?)
            .map_err(|_| JvError::AlreadyInitialized)
    })();
    code_from_result(&result)
}

/// Replaces the noise reduction intensity. Takes effect at the next frame boundary.
///
/// May run on a control thread while another thread is inside [`JV_PROCESS`].
///
/// # Safety
/// `handle` must be null or a live handle. `params` must be null or point to a valid struct.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn JV_UPDATE(handle: *mut JvHandle, params: *const JvParams) -> i32 {
    let result = (|| -> Result<(), JvError> {
        // SAFETY:
        // - The caller guarantees `handle` is null or a live handle.
        let handle = unsafe { handle_ref(handle) }?;
        // SAFETY:
        // - The caller guarantees `params` is null or points to a valid struct.
        let params = unsafe { params.as_ref() }.ok_or(JvError::NullException)?;
        let context = handle.context()?;
        context.set_intensity(Params::from(*params).noise_reduction_intensity)
    })();
    code_from_result(&result)
}

/// Denoises `length` samples per channel.
///
/// `input` holds `length * numInputChannels` interleaved samples and `output`
/// receives `length * numOutputChannels` interleaved samples. A `length` whose
/// buffers cannot be addressed reports `JV_NOT_SUPPORTED_SAMPLES_PER_BLOCK`.
///
/// # Safety
/// `handle` must be null or a live handle that no other thread is setting up
/// or processing. `input` and `output` must be null or valid for the sizes
/// above, and must not overlap.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn JV_PROCESS(
    handle: *mut JvHandle,
    input: *const f32,
    output: *mut f32,
    length: u32,
) -> i32 {
    let result = (|| -> Result<(), JvError> {
        // SAFETY:
        // - The caller guarantees `handle` is null or a live handle.
        let handle = unsafe { handle_ref(handle) }?;
        if input.is_null() || output.is_null() {
            return Err(JvError::NullException);
        }

        // SAFETY:
        // - Setup and process are never run concurrently on one handle, so this
        //   is the only reference into the engine cell. Control threads only
        //   read `handle.context`.
        let engine = unsafe { &mut *handle.engine.get() };
        let config = engine.config()?;
        let input_len = buffer_len(length, config.num_input_channels)?;
        let output_len = buffer_len(length, config.num_output_channels)?;

        // SAFETY:
        // - Both pointers are non-null and the caller guarantees they are valid
        //   for `input_len` and `output_len` floats without overlapping.
        let (input, output) = unsafe {
            (
                std::slice::from_raw_parts(input, input_len),
                std::slice::from_raw_parts_mut(output, output_len),
            )
        };
        engine.process(input, output)
    })();
    code_from_result(&result)
}

/// Writes the end-to-end delay in seconds into `latency`.
///
/// # Safety
/// `handle` must be null or a live handle. `latency` must be null or valid for a write.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn JV_GET_LATENCY(handle: *const JvHandle, latency: *mut f32) -> i32 {
    let result = (|| -> Result<(), JvError> {
        // SAFETY:
        // - The caller guarantees `handle` is null or a live handle.
        let handle = unsafe { handle_ref(handle) }?;
        // SAFETY:
        // - The caller guarantees `latency` is null or writable.
        let latency = unsafe { latency.as_mut() }.ok_or(JvError::NullException)?;
        *latency = handle.context()?.latency();
        Ok(())
    })();
    code_from_result(&result)
}
