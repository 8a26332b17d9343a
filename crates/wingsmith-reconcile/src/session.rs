use wingsmith_core::{Installer, InstallerManifest, PreviousManifest};

use crate::aggregate::build_installer_manifest;
use crate::context::BuildContext;
use crate::input::{InstallerRequest, ManifestInput};
use crate::reconcile::reconcile_installer;

/// Accumulates installers for one manifest build.
#[derive(Debug)]
pub struct ManifestSession<'a> {
    context: &'a BuildContext,
    previous: Option<&'a PreviousManifest>,
    installers: Vec<Installer>,
}

impl<'a> ManifestSession<'a> {
    pub fn new(context: &'a BuildContext, previous: Option<&'a PreviousManifest>) -> Self {
        Self {
            context,
            previous,
            installers: Vec::new(),
        }
    }

    pub fn installers(&self) -> &[Installer] {
        &self.installers
    }

    /// Reconciles one request and returns how many installers it produced.
    pub fn add_installer<F>(&mut self, request: &InstallerRequest, mut on_add: F) -> usize
    where
        F: FnMut(&Installer),
    {
        let position = self.installers.len();
        let installers = &mut self.installers;
        reconcile_installer(self.context, request, self.previous, position, |installer| {
            on_add(&installer);
            installers.push(installer);
        });
        self.installers.len() - position
    }

    pub fn finish(self, input: &ManifestInput) -> InstallerManifest {
        build_installer_manifest(self.context, input, self.installers, self.previous)
    }
}
