use super::error::{RegistryError, Result};
use super::types::VariableKind;
use crate::algebra::{Rotation, Vector};
use crate::expression::{input, input_rotation, Expr, ExpressionBase};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One named variable of the index space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSpec {
    pub name: String,
    pub index: usize,
    pub kind: VariableKind,
    /// Angular-velocity direction of a rotation variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis: Option<Vector>,
}

/// Owns the mapping from variable names to indices and kinds.
///
/// Leaves are built through the registry so every graph built from it agrees
/// on which index means what.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariableRegistry {
    variables: Vec<VariableSpec>,

    // Ephemeral lookup (Not serialized, rebuilt on load)
    #[serde(skip)]
    by_name: HashMap<String, usize>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn variables(&self) -> &[VariableSpec] {
        &self.variables
    }

    /// Size of a dense derivative vector over this registry.
    pub fn number_of_derivatives(&self) -> usize {
        self.variables.iter().map(|v| v.index + 1).max().unwrap_or(0)
    }

    pub fn declare_scalar(&mut self, name: &str) -> Result<usize> {
        self.declare(name, VariableKind::Scalar, None)
    }

    pub fn declare_rotation(&mut self, name: &str, axis: Vector) -> Result<usize> {
        if axis.norm() == 0.0 {
            return Err(RegistryError::DegenerateAxis(name.to_string()));
        }
        self.declare(name, VariableKind::Rotation, Some(axis))
    }

    fn declare(&mut self, name: &str, kind: VariableKind, axis: Option<Vector>) -> Result<usize> {
        if self.by_name.contains_key(name) {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }
        let index = self.number_of_derivatives();
        log::debug!("declared {} variable '{}' at index {}", kind, name, index);
        self.by_name.insert(name.to_string(), self.variables.len());
        self.variables.push(VariableSpec { name: name.to_string(), index, kind, axis });
        Ok(index)
    }

    pub fn lookup(&self, name: &str) -> Result<&VariableSpec> {
        self.by_name
            .get(name)
            .map(|&pos| &self.variables[pos])
            .ok_or_else(|| RegistryError::UnknownVariable(name.to_string()))
    }

    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.lookup(name).map(|spec| spec.index)
    }

    fn expect_kind(&self, name: &str, expected: VariableKind) -> Result<&VariableSpec> {
        let spec = self.lookup(name)?;
        if spec.kind != expected {
            return Err(RegistryError::KindMismatch {
                name: name.to_string(),
                expected,
                actual: spec.kind,
            });
        }
        Ok(spec)
    }

    /// A fresh scalar leaf for `name`.
    pub fn scalar(&self, name: &str) -> Result<Expr<f64>> {
        let spec = self.expect_kind(name, VariableKind::Scalar)?;
        Ok(input(spec.index))
    }

    /// A fresh rotation leaf for `name`.
    pub fn rotation(&self, name: &str) -> Result<Expr<Rotation>> {
        let spec = self.expect_kind(name, VariableKind::Rotation)?;
        let axis = spec.axis.ok_or_else(|| RegistryError::DegenerateAxis(name.to_string()))?;
        Ok(input_rotation(spec.index, axis))
    }

    pub fn set_scalar(&self, root: &dyn ExpressionBase, name: &str, value: f64) -> Result<()> {
        let spec = self.expect_kind(name, VariableKind::Scalar)?;
        root.set_input_value(spec.index, value);
        Ok(())
    }

    pub fn set_rotation(
        &self,
        root: &dyn ExpressionBase,
        name: &str,
        value: &Rotation,
    ) -> Result<()> {
        let spec = self.expect_kind(name, VariableKind::Rotation)?;
        root.set_input_rotation(spec.index, value);
        Ok(())
    }

    /// Dense operating point for `set_input_values`; unassigned entries are zero.
    pub fn scalar_values(&self, assignments: &[(&str, f64)]) -> Result<Vec<f64>> {
        let mut values = vec![0.0; self.number_of_derivatives()];
        for &(name, value) in assignments {
            let spec = self.expect_kind(name, VariableKind::Scalar)?;
            values[spec.index] = value;
        }
        Ok(values)
    }

    /// Rebuilds the name lookup after deserialization and validates the table.
    pub fn rebuild_name_cache(&mut self) -> Result<()> {
        self.by_name.clear();
        let mut by_index: HashMap<usize, &str> = HashMap::new();
        for (pos, spec) in self.variables.iter().enumerate() {
            if self.by_name.insert(spec.name.clone(), pos).is_some() {
                return Err(RegistryError::DuplicateName(spec.name.clone()));
            }
            if let Some(first) = by_index.insert(spec.index, &spec.name) {
                return Err(RegistryError::DuplicateIndex {
                    index: spec.index,
                    first: first.to_string(),
                    second: spec.name.clone(),
                });
            }
            if spec.kind == VariableKind::Rotation && spec.axis.map_or(true, |a| a.norm() == 0.0) {
                return Err(RegistryError::DegenerateAxis(spec.name.clone()));
            }
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut registry: Self = serde_json::from_str(json)?;
        registry.rebuild_name_cache()?;
        log::debug!("loaded variable registry with {} variables", registry.len());
        Ok(registry)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::ledger::EvalContext;
    use crate::expression::Expression;
    use rstest::rstest;
    use std::io::Write;

    fn sample() -> VariableRegistry {
        let mut reg = VariableRegistry::new();
        reg.declare_scalar("q0").unwrap();
        reg.declare_rotation("base", Vector::z()).unwrap();
        reg.declare_scalar("q1").unwrap();
        reg
    }

    #[test]
    fn test_indices_are_assigned_in_order() {
        let reg = sample();
        assert_eq!(reg.index_of("q0").unwrap(), 0);
        assert_eq!(reg.index_of("base").unwrap(), 1);
        assert_eq!(reg.index_of("q1").unwrap(), 2);
        assert_eq!(reg.number_of_derivatives(), 3);
    }

    #[rstest]
    #[case("q0", VariableKind::Rotation)]
    #[case("base", VariableKind::Scalar)]
    fn test_kind_mismatch(#[case] name: &str, #[case] wanted: VariableKind) {
        let reg = sample();
        let err = match wanted {
            VariableKind::Scalar => reg.scalar(name).err(),
            VariableKind::Rotation => reg.rotation(name).err(),
        };
        assert!(matches!(err, Some(RegistryError::KindMismatch { .. })));
    }

    #[test]
    fn test_duplicates_and_unknowns_are_rejected() {
        let mut reg = sample();
        assert!(matches!(reg.declare_scalar("q0"), Err(RegistryError::DuplicateName(_))));
        assert!(matches!(reg.index_of("nope"), Err(RegistryError::UnknownVariable(_))));
        assert!(matches!(
            reg.declare_rotation("wrist", Vector::zeros()),
            Err(RegistryError::DegenerateAxis(_))
        ));
    }

    #[test]
    fn test_named_set_reaches_leaves() {
        let reg = sample();
        let q1 = reg.scalar("q1").unwrap();
        reg.set_scalar(q1.as_base(), "q1", 0.25).unwrap();
        assert_eq!(q1.value(&mut EvalContext::new()), 0.25);

        let dense = reg.scalar_values(&[("q1", 2.0), ("q0", 1.0)]).unwrap();
        assert_eq!(dense, vec![1.0, 0.0, 2.0]);
    }

    #[test]
    fn test_json_round_trip_rebuilds_lookup() {
        let reg = sample();
        let json = reg.to_json().unwrap();
        let back = VariableRegistry::from_json_str(&json).unwrap();
        assert_eq!(back.variables(), reg.variables());
        assert_eq!(back.index_of("base").unwrap(), 1);
    }

    #[test]
    fn test_config_file_with_duplicate_index_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"variables": [
                {{"name": "a", "index": 0, "kind": "scalar"}},
                {{"name": "b", "index": 0, "kind": "scalar"}}
            ]}}"#
        )
        .unwrap();
        let err = VariableRegistry::from_path(file.path()).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateIndex { index: 0, .. }));
    }

    #[test]
    fn test_config_file_loads() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"variables": [
                {{"name": "elbow", "index": 4, "kind": "scalar"}},
                {{"name": "wrist", "index": 1, "kind": "rotation", "axis": [1.0, 0.0, 0.0]}}
            ]}}"#
        )
        .unwrap();
        let reg = VariableRegistry::from_path(file.path()).unwrap();
        assert_eq!(reg.number_of_derivatives(), 5);
        assert_eq!(reg.lookup("wrist").unwrap().axis, Some(Vector::x()));
        assert!(matches!(
            VariableRegistry::from_json_str("{not json"),
            Err(RegistryError::Config(_))
        ));
    }
}
