//! Scope chain for the lowerer.
//!
//! Scopes are arena-allocated and parent-linked; walks follow parent ids.
//! The root scope owns the emitted top-level names and the ordered root node
//! list; block scopes collect statements and local name aliases; switch
//! scopes accumulate dispatch prongs and the pending segment between case
//! labels; loop and condition scopes are markers for break targeting and
//! comma-operator blockification.

use hashbrown::HashSet;
use log::debug;
use std::num::NonZeroU32;
use thin_vec::ThinVec;

use crate::zig_ast::ZigNode;

/// Scope id; index + 1 into the scope arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(NonZeroU32);

impl ScopeId {
    pub const ROOT: Self = Self(NonZeroU32::new(1).unwrap());

    pub fn new(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(Self)
    }

    pub fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// Block scope payload.
#[derive(Debug, Default)]
pub struct BlockScope {
    pub stmts: Vec<ZigNode>,
    /// `c_name -> emitted_name` pairs, innermost-wins on lookup.
    pub aliases: Vec<(String, String)>,
    /// Per-block mangle counter.
    pub mangle_count: u32,
    pub label: Option<String>,
}

/// Switch scope payload.
///
/// The switch lowers to a dispatch `switch` whose prongs only jump to
/// labeled blocks; the statements between case labels accumulate in the
/// pending block and become the segments wrapped around the dispatch.
#[derive(Debug, Default)]
pub struct SwitchScope {
    /// Finalized dispatch prongs: case item expressions and target label.
    pub prongs: Vec<(ThinVec<ZigNode>, String)>,
    /// Finalized segments: label and the statements that follow it.
    pub segments: Vec<(String, Vec<ZigNode>)>,
    /// Block collecting statements since the last case label.
    pub pending: Option<ScopeId>,
    /// Label owning the statements currently accumulating in `pending`;
    /// `None` before the first case label (those statements are dead).
    pub current_label: Option<String>,
    /// Label of the whole lowered switch; synthesized lazily.
    pub switch_label: Option<String>,
    pub default_label: Option<String>,
}

/// The kind of a scope.
#[derive(Debug)]
pub enum ScopeKind {
    Root {
        symbols: HashSet<String>,
        nodes: Vec<ZigNode>,
    },
    Block(BlockScope),
    Switch(SwitchScope),
    Loop,
    /// Controlling expression of `if`/`while`/`for`/`?:`; materializes a
    /// block only if a comma operator forces one.
    Condition { block: Option<ScopeId> },
}

#[derive(Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
}

/// Arena of scopes; exactly one root, created up front.
#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack {
            scopes: vec![Scope {
                parent: None,
                kind: ScopeKind::Root {
                    symbols: HashSet::new(),
                    nodes: Vec::new(),
                },
            }],
        }
    }

    fn push(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        self.scopes.push(Scope {
            parent: Some(parent),
            kind,
        });
        let id = ScopeId::new(self.scopes.len() as u32).unwrap();
        debug!("scope: pushed {:?} under {:?}", id, parent);
        id
    }

    pub fn push_block(&mut self, parent: ScopeId) -> ScopeId {
        self.push(parent, ScopeKind::Block(BlockScope::default()))
    }

    pub fn push_loop(&mut self, parent: ScopeId) -> ScopeId {
        self.push(parent, ScopeKind::Loop)
    }

    pub fn push_switch(&mut self, parent: ScopeId) -> ScopeId {
        self.push(parent, ScopeKind::Switch(SwitchScope::default()))
    }

    pub fn push_condition(&mut self, parent: ScopeId) -> ScopeId {
        self.push(parent, ScopeKind::Condition { block: None })
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn get_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    pub fn block(&self, id: ScopeId) -> &BlockScope {
        match &self.get(id).kind {
            ScopeKind::Block(b) => b,
            _ => panic!("ICE: scope {:?} is not a block", id),
        }
    }

    pub fn block_mut(&mut self, id: ScopeId) -> &mut BlockScope {
        match &mut self.get_mut(id).kind {
            ScopeKind::Block(b) => b,
            _ => panic!("ICE: scope {:?} is not a block", id),
        }
    }

    pub fn switch_mut(&mut self, id: ScopeId) -> &mut SwitchScope {
        match &mut self.get_mut(id).kind {
            ScopeKind::Switch(s) => s,
            _ => panic!("ICE: scope {:?} is not a switch", id),
        }
    }

    pub fn root_symbols(&self) -> &HashSet<String> {
        match &self.get(ScopeId::ROOT).kind {
            ScopeKind::Root { symbols, .. } => symbols,
            _ => unreachable!(),
        }
    }

    pub fn bind_root(&mut self, name: impl Into<String>) {
        match &mut self.get_mut(ScopeId::ROOT).kind {
            ScopeKind::Root { symbols, .. } => {
                symbols.insert(name.into());
            }
            _ => unreachable!(),
        }
    }

    pub fn root_nodes_mut(&mut self) -> &mut Vec<ZigNode> {
        match &mut self.get_mut(ScopeId::ROOT).kind {
            ScopeKind::Root { nodes, .. } => nodes,
            _ => unreachable!(),
        }
    }

    pub fn take_root_nodes(&mut self) -> Vec<ZigNode> {
        std::mem::take(self.root_nodes_mut())
    }

    /// Innermost enclosing block, materializing the lazy block of any
    /// condition scope the walk passes through.
    pub fn find_block_scope(&mut self, from: ScopeId) -> Option<ScopeId> {
        let mut cur = Some(from);
        while let Some(id) = cur {
            match &self.get(id).kind {
                ScopeKind::Block(_) => return Some(id),
                // Statements inside a switch land in its pending block.
                ScopeKind::Switch(SwitchScope {
                    pending: Some(b), ..
                }) => return Some(*b),
                ScopeKind::Condition { block: Some(b) } => return Some(*b),
                ScopeKind::Condition { block: None } => {
                    let materialized = self.push_block(id);
                    match &mut self.get_mut(id).kind {
                        ScopeKind::Condition { block } => *block = Some(materialized),
                        _ => unreachable!(),
                    }
                    return Some(materialized);
                }
                ScopeKind::Root { .. } => return None,
                _ => cur = self.get(id).parent,
            }
        }
        None
    }

    /// Nearest switch or loop scope. Reaching the root is a programmer
    /// error: the front-end only places break/continue inside one.
    pub fn breakable_scope(&self, from: ScopeId) -> ScopeId {
        let mut cur = Some(from);
        while let Some(id) = cur {
            match &self.get(id).kind {
                ScopeKind::Switch(_) | ScopeKind::Loop => return id,
                ScopeKind::Root { .. } => break,
                _ => cur = self.get(id).parent,
            }
        }
        panic!("ICE: break/continue outside of any breakable scope");
    }

    /// Nearest loop scope, jumping over switches (`continue` in C ignores
    /// the switch).
    pub fn loop_scope(&self, from: ScopeId) -> ScopeId {
        let mut cur = Some(from);
        while let Some(id) = cur {
            match &self.get(id).kind {
                ScopeKind::Loop => return id,
                ScopeKind::Root { .. } => break,
                _ => cur = self.get(id).parent,
            }
        }
        panic!("ICE: continue outside of any loop scope");
    }

    /// Append a statement to the innermost block, or to the root node list.
    pub fn append_node(&mut self, from: ScopeId, node: ZigNode) {
        match self.find_block_scope(from) {
            Some(block) => self.block_mut(block).stmts.push(node),
            None => self.root_nodes_mut().push(node),
        }
    }

    /// Innermost alias for `name`; unchanged when nothing rebinds it.
    pub fn get_alias(&self, from: ScopeId, name: &str) -> String {
        let mut cur = Some(from);
        while let Some(id) = cur {
            if let ScopeKind::Block(block) = &self.get(id).kind
                && let Some((_, alias)) = block.aliases.iter().rev().find(|(c, _)| c == name)
            {
                return alias.clone();
            }
            cur = self.get(id).parent;
        }
        name.to_string()
    }

    /// Whether `name` is bound in `from` or any enclosing scope, the root
    /// included.
    pub fn is_bound(&self, from: ScopeId, name: &str) -> bool {
        let mut cur = Some(from);
        while let Some(id) = cur {
            match &self.get(id).kind {
                ScopeKind::Block(block) => {
                    if block.aliases.iter().any(|(c, a)| c == name || a == name) {
                        return true;
                    }
                }
                ScopeKind::Root { symbols, .. } => return symbols.contains(name),
                _ => {}
            }
            cur = self.get(id).parent;
        }
        false
    }
}
