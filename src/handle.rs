use crate::{
    config::{Config, Params},
    engine::Engine,
    error::JvError,
    transform::TransformFactory,
};

/// Owning slot for an [`Engine`], following the create / destroy discipline of the C API.
///
/// An empty slot stands for a handle that was never created or has been
/// destroyed. Every operation on an empty slot fails with
/// [`JvError::NotCreated`], and creating into an occupied slot fails with
/// [`JvError::AlreadyCreated`].
///
/// # Example
///
/// ```rust
/// use just_voice::{Config, Handle, JvError, Params};
///
/// let mut handle = Handle::empty();
/// handle.create().unwrap();
/// handle.setup(&Config::new(16000), &Params::default()).unwrap();
///
/// handle.destroy().unwrap();
/// assert_eq!(handle.latency(), Err(JvError::NotCreated));
/// ```
#[derive(Default)]
pub struct Handle {
    engine: Option<Box<Engine>>,
}

impl Handle {
    pub const fn empty() -> Self {
        Self { engine: None }
    }

    /// Creates an engine backed by the built-in spectral gate.
    ///
    /// The engine is boxed with the global allocator, which aborts when memory
    /// runs out. Buffer allocation failures surface from [`Handle::setup`] as
    /// [`JvError::AllocationFailed`].
    pub fn create(&mut self) -> Result<(), JvError> {
        self.create_from(Engine::create)
    }

    /// Creates an engine that uses `factory` for its frame transforms.
    pub fn create_with(&mut self, factory: impl TransformFactory + 'static) -> Result<(), JvError> {
        self.create_from(|| Engine::with_transform(factory))
    }

    fn create_from(
        &mut self,
        create: impl FnOnce() -> Result<Engine, JvError>,
    ) -> Result<(), JvError> {
        if self.engine.is_some() {
            return Err(JvError::AlreadyCreated);
        }
        self.engine = Some(Box::new(create()?));
        Ok(())
    }

    /// Releases the engine and all of its buffers, leaving the slot empty.
    pub fn destroy(&mut self) -> Result<(), JvError> {
        self.engine.take().map(drop).ok_or(JvError::NotCreated)
    }

    pub fn is_created(&self) -> bool {
        self.engine.is_some()
    }

    /// See [`Engine::setup`].
    pub fn setup(&mut self, config: &Config, params: &Params) -> Result<(), JvError> {
        self.engine_mut()?.setup(config, params)
    }

    /// See [`Engine::update`].
    pub fn update(&self, params: &Params) -> Result<(), JvError> {
        self.engine()?.update(params)
    }

    /// See [`Engine::process`].
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) -> Result<(), JvError> {
        self.engine_mut()?.process(input, output)
    }

    /// See [`Engine::latency`].
    pub fn latency(&self) -> Result<f32, JvError> {
        self.engine()?.latency()
    }

    /// Borrows the engine held by this slot.
    pub fn engine(&self) -> Result<&Engine, JvError> {
        self.engine.as_deref().ok_or(JvError::NotCreated)
    }

    pub fn engine_mut(&mut self) -> Result<&mut Engine, JvError> {
        self.engine.as_deref_mut().ok_or(JvError::NotCreated)
    }
}
