//! Provisioning: assemble the stack spec and hand it to a [`Provisioner`].
//!
//! [`assemble`] / [`assemble_locale`] build a [`StackSpec`]; [`provision`] assembles and
//! provisions in one step.

mod assemble;
mod provisioner;
pub mod spec;

use std::path::Path;

pub use assemble::{assemble, assemble_locale, template_values, AssembleError, MIN_INSTRUCTION_CHARS};
pub use provisioner::{ManifestProvisioner, MockProvisioner, ProvisionError, Provisioner, StackHandle};
pub use spec::StackSpec;

use crate::prompts::TemplateValues;
use crate::settings::ProvisionSettings;

/// Error from a full provisioning run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Assemble(#[from] AssembleError),
    #[error(transparent)]
    Provision(#[from] ProvisionError),
}

/// Assembles the stack spec for `lang` and passes it to `provisioner`.
///
/// The provisioner is only called once the stack spec is fully assembled.
pub async fn provision(
    provisioner: &dyn Provisioner,
    root: &Path,
    lang: Option<&str>,
    settings: &ProvisionSettings,
    extra: &TemplateValues,
) -> Result<(StackSpec, StackHandle), RunError> {
    let spec = assemble_locale(root, lang, settings, extra).await?;
    let handle = provisioner.provision(&spec).await?;
    Ok((spec, handle))
}
