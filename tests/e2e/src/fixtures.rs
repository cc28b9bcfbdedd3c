//! Test fixtures and setup utilities.

use export_surface::{Employee, Instance, SurfaceConfig, SurfaceError};

/// Fresh load of the hello world unit.
pub fn load_hello_world() -> Result<Instance, SurfaceError> {
    Instance::new(hello_world::export_table()?)
}

/// Fresh load of the add numbers unit.
pub fn load_add_numbers() -> Result<Instance, SurfaceError> {
    Instance::new(add_numbers::export_table()?)
}

/// The employee used throughout the scenarios.
pub fn ada() -> Employee {
    Employee::new("Ada", 30)
}

/// A host with both units loaded side by side.
pub struct Host {
    pub hello_world: Instance,
    pub add_numbers: Instance,
}

impl Host {
    /// Load both units with default configuration.
    pub fn load() -> Result<Self, SurfaceError> {
        Ok(Host {
            hello_world: load_hello_world()?,
            add_numbers: load_add_numbers()?,
        })
    }

    /// Load both units with call tracing disabled.
    pub fn load_quiet() -> Result<Self, SurfaceError> {
        let config = SurfaceConfig {
            trace_calls: false,
            ..SurfaceConfig::default()
        };
        Ok(Host {
            hello_world: Instance::new_with_config(hello_world::export_table()?, config.clone())?,
            add_numbers: Instance::new_with_config(add_numbers::export_table()?, config)?,
        })
    }
}
