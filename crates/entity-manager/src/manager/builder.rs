//! Builder for [`EntityManager`].

use std::sync::Arc;

use tracing::{debug, warn};

use crate::codegen::{CodeGenerator, IncrementalCodeGenerator, UrlFriendlyCodeGenerator};
use crate::config::ManagerOptions;
use crate::core::{
    CaseFoldNormalizer, Capability, CapabilityRegistry, Clock, ConcurrencyController,
    EntityStore, LookupNormalizer, SystemClock,
};
use crate::error::ManagerResult;
use crate::search::SearchEngine;
use crate::types::Entity;
use crate::validation::{
    CodeFormatValidator, DetailValidator, DuplicateCodeValidator, DuplicateNameValidator,
    EntityValidator, RequiredNameValidator, ValidatorChain,
};

use super::EntityManager;

enum GeneratorChoice<E: Entity> {
    Custom(Arc<dyn CodeGenerator<E>>),
    Incremental,
    UrlFriendly,
}

/// Builder for [`EntityManager`].
///
/// # Example
///
/// ```ignore
/// let manager = EntityManager::builder(store)
///     .with_options(ManagerOptions::default().with_code_prefix("WH-"))
///     .with_incremental_codes()
///     .with_default_validators()
///     .build()?;
/// ```
pub struct EntityManagerBuilder<E: Entity> {
    store: Arc<dyn EntityStore<E>>,
    options: ManagerOptions,
    normalizer: Arc<dyn LookupNormalizer>,
    generator: Option<GeneratorChoice<E>>,
    default_validators: bool,
    validators: Vec<Arc<dyn EntityValidator<E>>>,
    detail_validators: Vec<Arc<dyn DetailValidator<E>>>,
    clock: Arc<dyn Clock>,
}

impl<E: Entity> EntityManagerBuilder<E> {
    /// Starts a builder over `store`.
    pub fn new(store: impl EntityStore<E> + 'static) -> Self {
        Self::from_arc(Arc::new(store))
    }

    /// Starts a builder over a shared store handle.
    pub fn from_arc(store: Arc<dyn EntityStore<E>>) -> Self {
        Self {
            store,
            options: ManagerOptions::default(),
            normalizer: Arc::new(CaseFoldNormalizer),
            generator: None,
            default_validators: false,
            validators: Vec::new(),
            detail_validators: Vec::new(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the options.
    pub fn with_options(mut self, options: ManagerOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the lookup normalizer.
    pub fn with_normalizer(mut self, normalizer: impl LookupNormalizer + 'static) -> Self {
        self.normalizer = Arc::new(normalizer);
        self
    }

    /// Replaces the clock used for timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Uses a custom code generator.
    pub fn with_code_generator(mut self, generator: impl CodeGenerator<E> + 'static) -> Self {
        self.generator = Some(GeneratorChoice::Custom(Arc::new(generator)));
        self
    }

    /// Generates `code_prefix + n` codes, continuing from the latest entity.
    pub fn with_incremental_codes(mut self) -> Self {
        self.generator = Some(GeneratorChoice::Incremental);
        self
    }

    /// Generates codes from the entity's name.
    pub fn with_url_friendly_codes(mut self) -> Self {
        self.generator = Some(GeneratorChoice::UrlFriendly);
        self
    }

    /// Appends a validator. Validators run in registration order.
    pub fn with_validator(mut self, validator: impl EntityValidator<E> + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Appends a detail validator.
    pub fn with_detail_validator(mut self, validator: impl DetailValidator<E> + 'static) -> Self {
        self.detail_validators.push(Arc::new(validator));
        self
    }

    /// Registers the built-in validators matching the store's capabilities,
    /// ahead of any custom validator.
    pub fn with_default_validators(mut self) -> Self {
        self.default_validators = true;
        self
    }

    /// Validates the options and builds the manager.
    pub fn build(self) -> ManagerResult<EntityManager<E>> {
        self.options.validate()?;

        let registry = CapabilityRegistry::new(self.store);

        let code_generator: Option<Arc<dyn CodeGenerator<E>>> = match self.generator {
            None => None,
            Some(GeneratorChoice::Custom(generator)) => Some(generator),
            Some(GeneratorChoice::Incremental) => Some(Arc::new(IncrementalCodeGenerator::new(
                self.options.code_prefix.clone(),
            ))),
            Some(GeneratorChoice::UrlFriendly) => Some(Arc::new(UrlFriendlyCodeGenerator::new(
                self.options.slug_separator.clone(),
            )?)),
        };
        if code_generator.is_some() && !registry.supports(Capability::CodeBased) {
            warn!(
                backend = registry.backend_name(),
                entity = E::entity_type(),
                "Code generator configured but the store is not code-based; it will never run"
            );
        }

        let mut validators = ValidatorChain::new();
        if self.default_validators {
            let named = registry.supports(Capability::NameBased)
                || registry.supports(Capability::ScopedNameBased);
            if named {
                validators.push(Arc::new(RequiredNameValidator));
                validators.push(Arc::new(DuplicateNameValidator));
            }
            if registry.supports(Capability::CodeBased) {
                validators.push(Arc::new(CodeFormatValidator));
                validators.push(Arc::new(DuplicateCodeValidator));
            }
        }
        for validator in self.validators {
            validators.push(validator);
        }
        for validator in self.detail_validators {
            validators.push_detail(validator);
        }

        debug!(
            backend = registry.backend_name(),
            entity = E::entity_type(),
            validators = validators.len(),
            detail_validators = validators.detail_len(),
            "Built entity manager"
        );

        Ok(EntityManager {
            search: SearchEngine::from_options(&self.options),
            registry,
            options: self.options,
            normalizer: self.normalizer,
            code_generator,
            validators,
            concurrency: ConcurrencyController::new(),
            clock: self.clock,
        })
    }
}
