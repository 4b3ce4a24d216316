use std::env;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ServiceContext {
    pub(crate) service_name: String,
    pub(crate) environment: String,
    pub(crate) component: String,
}

#[derive(Clone, Debug)]
pub(crate) struct ObservabilityConfig {
    pub(crate) service_context: ServiceContext,
}

impl ObservabilityConfig {
    pub(crate) fn from_env(component: &str) -> Self {
        Self::from_values(
            component,
            env_string("SERVICE_NAME"),
            env_string("STAGE"),
        )
    }

    fn from_values(
        component: &str,
        service_name: Option<String>,
        stage: Option<String>,
    ) -> Self {
        let component = component.trim().to_string();

        let service_name = service_name
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| component.clone());

        let environment = stage
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "unknown".to_string());

        Self {
            service_context: ServiceContext {
                service_name,
                environment,
                component,
            },
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_component_and_unknown_stage() {
        let config = ObservabilityConfig::from_values(" worker ", Some(" ".to_string()), None);

        assert_eq!(
            config.service_context,
            ServiceContext {
                service_name: "worker".to_string(),
                environment: "unknown".to_string(),
                component: "worker".to_string(),
            }
        );
    }

    #[test]
    fn uses_explicit_service_name_and_stage() {
        let config = ObservabilityConfig::from_values(
            "backend",
            Some("viskatera-api".to_string()),
            Some("production".to_string()),
        );

        assert_eq!(config.service_context.service_name, "viskatera-api");
        assert_eq!(config.service_context.environment, "production");
    }
}
