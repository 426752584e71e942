//! # Node Metadata
//!
//! The closed set of node kinds the compiler knows how to emit, and the
//! catalog of definitions that maps editor definition ids onto them.
//!
//! Definition ids are strings in the graph, but the compiler never dispatches
//! on strings directly: [`NodeKind::from_definition_id`] resolves an id through
//! a lookup table once, and every emitter matches on the resulting enum, so a
//! new kind is an exhaustiveness error rather than a silent fallthrough.

mod catalog;

pub use catalog::NodeCatalog;

use std::collections::HashMap;
use std::sync::OnceLock;

pub const FUNCTION_START_ID: &str = "function_start";
pub const FUNCTION_PARAMETER_ID: &str = "function_parameter";
pub const FUNCTION_RETURN_ID: &str = "function_return";

/// Component lifecycle hooks, in the order the runtime invokes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleHook {
    OnLoad,
    Start,
    Update,
    LateUpdate,
    OnEnable,
    OnDisable,
    OnDestroy,
}

impl LifecycleHook {
    pub const ALL: [LifecycleHook; 7] = [
        LifecycleHook::OnLoad,
        LifecycleHook::Start,
        LifecycleHook::Update,
        LifecycleHook::LateUpdate,
        LifecycleHook::OnEnable,
        LifecycleHook::OnDisable,
        LifecycleHook::OnDestroy,
    ];

    /// Definition id of the hook's entry node. Doubles as the method name.
    pub fn definition_id(self) -> &'static str {
        match self {
            LifecycleHook::OnLoad => "onLoad",
            LifecycleHook::Start => "start",
            LifecycleHook::Update => "update",
            LifecycleHook::LateUpdate => "lateUpdate",
            LifecycleHook::OnEnable => "onEnable",
            LifecycleHook::OnDisable => "onDisable",
            LifecycleHook::OnDestroy => "onDestroy",
        }
    }

    pub fn method_name(self) -> &'static str {
        self.definition_id()
    }

    /// Per-frame hooks receive the frame delta.
    pub fn takes_delta_time(self) -> bool {
        matches!(self, LifecycleHook::Update | LifecycleHook::LateUpdate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstantKind {
    Number,
    String,
    Boolean,
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicOp {
    And,
    Or,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Equal,
    Greater,
    Less,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conversion {
    ToString,
    ToNumber,
    ToBoolean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringOp {
    Concat,
    Length,
    Contains,
    Replace,
}

/// Every node kind the code generator has an emission rule for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    FunctionStart,
    Lifecycle(LifecycleHook),
    FunctionParameter,
    FunctionReturn,
    Constant(ConstantKind),
    Print,
    End,
    Delay,
    Sequence,
    Parallel,
    IfCondition,
    ForLoop,
    Switch,
    Math(MathOp),
    RandomNumber,
    Abs,
    Text(StringOp),
    Logic(LogicOp),
    Compare(CompareOp),
    GetVariable,
    SetVariable,
    Convert(Conversion),
    DebugLog,
    DebugBreak,
    DebugWatch,
}

/// Definition id -> kind. The single registration point for new kinds.
const KIND_TABLE: &[(&str, NodeKind)] = &[
    (FUNCTION_START_ID, NodeKind::FunctionStart),
    ("onLoad", NodeKind::Lifecycle(LifecycleHook::OnLoad)),
    ("start", NodeKind::Lifecycle(LifecycleHook::Start)),
    ("update", NodeKind::Lifecycle(LifecycleHook::Update)),
    ("lateUpdate", NodeKind::Lifecycle(LifecycleHook::LateUpdate)),
    ("onEnable", NodeKind::Lifecycle(LifecycleHook::OnEnable)),
    ("onDisable", NodeKind::Lifecycle(LifecycleHook::OnDisable)),
    ("onDestroy", NodeKind::Lifecycle(LifecycleHook::OnDestroy)),
    (FUNCTION_PARAMETER_ID, NodeKind::FunctionParameter),
    (FUNCTION_RETURN_ID, NodeKind::FunctionReturn),
    ("number_constant", NodeKind::Constant(ConstantKind::Number)),
    ("string_constant", NodeKind::Constant(ConstantKind::String)),
    ("boolean_constant", NodeKind::Constant(ConstantKind::Boolean)),
    ("null_constant", NodeKind::Constant(ConstantKind::Null)),
    ("print", NodeKind::Print),
    ("end", NodeKind::End),
    ("delay", NodeKind::Delay),
    ("sequence", NodeKind::Sequence),
    ("parallel", NodeKind::Parallel),
    ("if_condition", NodeKind::IfCondition),
    ("for_loop", NodeKind::ForLoop),
    ("switch", NodeKind::Switch),
    ("add_numbers", NodeKind::Math(MathOp::Add)),
    ("subtract_numbers", NodeKind::Math(MathOp::Subtract)),
    ("multiply_numbers", NodeKind::Math(MathOp::Multiply)),
    ("divide_numbers", NodeKind::Math(MathOp::Divide)),
    ("random_number", NodeKind::RandomNumber),
    ("math_abs", NodeKind::Abs),
    ("string_concat", NodeKind::Text(StringOp::Concat)),
    ("string_length", NodeKind::Text(StringOp::Length)),
    ("string_contains", NodeKind::Text(StringOp::Contains)),
    ("string_replace", NodeKind::Text(StringOp::Replace)),
    ("logic_and", NodeKind::Logic(LogicOp::And)),
    ("logic_or", NodeKind::Logic(LogicOp::Or)),
    ("logic_not", NodeKind::Logic(LogicOp::Not)),
    ("compare_equal", NodeKind::Compare(CompareOp::Equal)),
    ("compare_greater", NodeKind::Compare(CompareOp::Greater)),
    ("compare_less", NodeKind::Compare(CompareOp::Less)),
    ("get_variable", NodeKind::GetVariable),
    ("set_variable", NodeKind::SetVariable),
    ("to_string", NodeKind::Convert(Conversion::ToString)),
    ("to_number", NodeKind::Convert(Conversion::ToNumber)),
    ("to_boolean", NodeKind::Convert(Conversion::ToBoolean)),
    ("debug_log", NodeKind::DebugLog),
    ("debug_break", NodeKind::DebugBreak),
    ("debug_watch", NodeKind::DebugWatch),
];

static KIND_INDEX: OnceLock<HashMap<&'static str, NodeKind>> = OnceLock::new();

fn kind_index() -> &'static HashMap<&'static str, NodeKind> {
    KIND_INDEX.get_or_init(|| KIND_TABLE.iter().copied().collect())
}

impl NodeKind {
    /// Resolve a definition id. `None` means the kind has no emitter.
    pub fn from_definition_id(definition_id: &str) -> Option<NodeKind> {
        kind_index().get(definition_id).copied()
    }

    pub fn definition_id(self) -> &'static str {
        KIND_TABLE
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(id, _)| *id)
            .unwrap_or("unknown")
    }

    /// Entry nodes seed a traversal.
    pub fn is_entry(self) -> bool {
        matches!(self, NodeKind::FunctionStart | NodeKind::Lifecycle(_))
    }

    /// Value-producing nodes with no place in execution flow. They are emitted
    /// on demand wherever one of their outputs is consumed.
    pub fn is_pure(self) -> bool {
        matches!(
            self,
            NodeKind::Constant(_)
                | NodeKind::Math(_)
                | NodeKind::RandomNumber
                | NodeKind::Abs
                | NodeKind::Text(_)
                | NodeKind::Logic(_)
                | NodeKind::Compare(_)
                | NodeKind::GetVariable
                | NodeKind::Convert(_)
        )
    }

    /// Control nodes route their own exec outputs instead of falling through.
    pub fn is_control(self) -> bool {
        matches!(
            self,
            NodeKind::Sequence
                | NodeKind::Parallel
                | NodeKind::IfCondition
                | NodeKind::ForLoop
                | NodeKind::Switch
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_lookup_round_trips() {
        for (id, kind) in KIND_TABLE {
            assert_eq!(NodeKind::from_definition_id(id), Some(*kind));
            assert_eq!(kind.definition_id(), *id);
        }
    }

    #[test]
    fn test_unknown_kind() {
        assert_eq!(NodeKind::from_definition_id("teleport"), None);
        assert_eq!(NodeKind::from_definition_id("input"), None);
    }

    #[test]
    fn test_kind_classes_are_disjoint() {
        for (_, kind) in KIND_TABLE {
            let classes = [kind.is_entry(), kind.is_pure(), kind.is_control()];
            assert!(classes.iter().filter(|c| **c).count() <= 1, "{:?}", kind);
        }
    }

    #[test]
    fn test_lifecycle_hooks() {
        assert_eq!(LifecycleHook::ALL.len(), 7);
        assert!(LifecycleHook::Update.takes_delta_time());
        assert!(!LifecycleHook::Start.takes_delta_time());
        assert_eq!(
            NodeKind::from_definition_id("lateUpdate"),
            Some(NodeKind::Lifecycle(LifecycleHook::LateUpdate))
        );
    }
}
