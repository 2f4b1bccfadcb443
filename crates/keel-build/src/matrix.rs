//! Resolution of one target across several configurations
use crate::configuration::TargetConfiguration;
use crate::error::ResolveResult;
use crate::module::ModuleDeclaration;
use crate::platform::PlatformCapabilities;
use crate::resolved_target::ResolvedTarget;
use crate::target::TargetDeclaration;
use rayon::prelude::*;
use tracing::warn;

/// Outcome of resolving one configuration
#[derive(Debug)]
pub struct ConfigurationResolution {
    pub configuration: TargetConfiguration,
    pub result: ResolveResult<ResolvedTarget>,
}

/// Resolve `target` once per configuration, in parallel
///
/// Every configuration builds its own graph; a failing configuration does
/// not affect the others. Results keep the order of `configurations`.
pub fn resolve_configurations(
    platform: &dyn PlatformCapabilities,
    target: &TargetDeclaration,
    modules: &[ModuleDeclaration],
    configurations: &[TargetConfiguration],
) -> Vec<ConfigurationResolution> {
    configurations
        .par_iter()
        .map(|&configuration| {
            let declaration = target.clone().with_configuration(configuration);
            let result = ResolvedTarget::resolve(platform, &declaration, modules);

            if let Err(error) = &result {
                warn!(
                    name = %target.name,
                    %configuration,
                    %error,
                    "configuration failed to resolve"
                );
            }

            ConfigurationResolution {
                configuration,
                result,
            }
        })
        .collect()
}
