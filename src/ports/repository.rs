//! Repository port for model persistence.

use std::path::Path;

use crate::{Result, model::Macid};

/// Port for persisting and loading influence diagrams.
///
/// Implementations store the model's [`ModelSpec`](crate::model::ModelSpec)
/// and rebuild the model through [`Macid::from_spec`] on load, so a loaded
/// model has passed the same structural checks as one built in code.
///
/// # Examples
///
/// ```no_run
/// use macid::ports::ModelRepository;
/// use macid::Macid;
/// use std::path::Path;
///
/// fn archive<R: ModelRepository>(repo: &R, model: &Macid) -> macid::Result<()> {
///     repo.save(model, Path::new("model.json"))
/// }
/// ```
pub trait ModelRepository {
    /// Save a model to persistent storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be written or serialization fails.
    fn save(&self, model: &Macid, path: &Path) -> Result<()>;

    /// Load a model from persistent storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not a valid model
    /// description, or describes an invalid model.
    fn load(&self, path: &Path) -> Result<Macid>;
}
