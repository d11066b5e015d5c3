use std::collections::HashSet;

use crate::types::{
    ActionDef, ActionRegistry, AffixRules, ClassNames, ConfigError, EngineConfig, Evaluation,
    EvaluationDef, EvaluationTable,
};

pub(crate) fn compile(
    actions: Vec<ActionDef>,
    negatives: Vec<(String, String)>,
    evaluations: Vec<EvaluationDef>,
    affixes: AffixRules,
    class_names: ClassNames,
) -> Result<EngineConfig, ConfigError> {
    check_duplicates(&actions)?;

    let mut registry = ActionRegistry::new();
    for def in actions {
        registry.register(&def.name, def.function);
    }

    check_negatives(&negatives, &registry)?;

    let mut table = EvaluationTable::new();
    for def in evaluations {
        table.insert(Evaluation::compile(&def.pattern, def.default, def.predicate)?);
    }

    tracing::debug!(
        actions = registry.len(),
        negatives = negatives.len(),
        evaluations = table.len(),
        "engine configuration compiled"
    );

    Ok(EngineConfig {
        actions: registry,
        negatives,
        evaluations: table,
        affixes,
        class_names,
    })
}

/// Plain registrations must be unique; overrides may replace any name.
fn check_duplicates(actions: &[ActionDef]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for def in actions {
        if !seen.insert(def.name.as_str()) && !def.replace {
            return Err(ConfigError::DuplicateAction {
                name: def.name.clone(),
            });
        }
    }
    Ok(())
}

fn check_negatives(
    negatives: &[(String, String)],
    registry: &ActionRegistry,
) -> Result<(), ConfigError> {
    for (action, negative) in negatives {
        for name in [action, negative] {
            if !registry.contains(name) {
                return Err(ConfigError::UndefinedNegative {
                    action: action.clone(),
                    negative: name.clone(),
                });
            }
        }
    }
    Ok(())
}
