//! Call-script executor dispatching actions to registered targets

use anchor_lang::prelude::{borsh, AnchorDeserialize, AnchorSerialize, Pubkey};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tollgate::{ActionExecutor, ExecutionError};
use tracing::debug;

/// Version tag of the only script format this executor understands
pub const CALLS_SCRIPT_VERSION: u32 = 1;

/// Calldata `CounterTarget` accepts
pub const EXECUTE_SELECTOR: &[u8] = b"execute";

// ================================
// Script Format
// ================================

#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, Debug)]
pub struct ScriptAction {
    pub target: Pubkey,
    pub calldata: Vec<u8>,
}

impl ScriptAction {
    pub fn new(target: Pubkey, calldata: impl Into<Vec<u8>>) -> Self {
        Self {
            target,
            calldata: calldata.into(),
        }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, Debug)]
pub struct CallScript {
    pub version: u32,
    pub actions: Vec<ScriptAction>,
}

impl CallScript {
    pub fn new(actions: Vec<ScriptAction>) -> Self {
        Self {
            version: CALLS_SCRIPT_VERSION,
            actions,
        }
    }

    pub fn encode(&self) -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.serialize(&mut buf)?;
        Ok(buf)
    }

    pub fn decode(payload: &[u8]) -> Result<Self, ExecutionError> {
        let script = Self::try_from_slice(payload)
            .map_err(|e| ExecutionError::MalformedScript(e.to_string()))?;
        if script.version != CALLS_SCRIPT_VERSION {
            return Err(ExecutionError::UnsupportedScriptVersion(script.version));
        }
        Ok(script)
    }
}

/// Encode `actions` as a call script payload
pub fn encode_call_script(actions: Vec<ScriptAction>) -> std::io::Result<Vec<u8>> {
    CallScript::new(actions).encode()
}

// ================================
// Execution Targets
// ================================

/// Something a script action can call into.
///
/// Calls are staged: their effects become visible only once the executor
/// commits after every action in the script has succeeded.
pub trait ExecutionTarget: Send {
    fn call(&mut self, sender: &Pubkey, calldata: &[u8]) -> Result<(), String>;

    /// Apply every call staged since the last commit or discard
    fn commit(&mut self) {}

    /// Drop every call staged since the last commit or discard
    fn discard(&mut self) {}
}

/// Target that counts `execute` calls
#[derive(Debug, Default)]
pub struct CounterTarget {
    counter: Arc<AtomicU64>,
    pending: u64,
}

impl CounterTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared view of the counter that stays valid after the target is registered
    pub fn counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.counter)
    }
}

impl ExecutionTarget for CounterTarget {
    fn call(&mut self, _sender: &Pubkey, calldata: &[u8]) -> Result<(), String> {
        if calldata != EXECUTE_SELECTOR {
            return Err("unknown selector".to_string());
        }
        self.pending += 1;
        Ok(())
    }

    fn commit(&mut self) {
        self.counter.fetch_add(self.pending, Ordering::SeqCst);
        self.pending = 0;
    }

    fn discard(&mut self) {
        self.pending = 0;
    }
}

/// Target that rejects every call
#[derive(Debug)]
pub struct RevertingTarget {
    reason: String,
}

impl RevertingTarget {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl ExecutionTarget for RevertingTarget {
    fn call(&mut self, _sender: &Pubkey, _calldata: &[u8]) -> Result<(), String> {
        Err(self.reason.clone())
    }
}

// ================================
// Script Executor
// ================================

#[derive(Default)]
pub struct ScriptExecutor {
    targets: HashMap<Pubkey, Box<dyn ExecutionTarget>>,
    executions: u64,
}

impl ScriptExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `target` at `address`, returning the target it replaced
    pub fn register_target(
        &mut self,
        address: Pubkey,
        target: impl ExecutionTarget + 'static,
    ) -> Option<Box<dyn ExecutionTarget>> {
        self.targets.insert(address, Box::new(target))
    }

    /// Number of scripts run to completion
    pub fn executions(&self) -> u64 {
        self.executions
    }
}

impl ActionExecutor for ScriptExecutor {
    fn execute(&mut self, sender: &Pubkey, payload: &[u8]) -> Result<(), ExecutionError> {
        let script = CallScript::decode(payload)?;

        // Resolve every target up front so an unknown address fails before any call runs
        if let Some(missing) = script
            .actions
            .iter()
            .find(|action| !self.targets.contains_key(&action.target))
        {
            return Err(ExecutionError::UnknownTarget(missing.target));
        }

        let mut touched: Vec<Pubkey> = Vec::new();
        let outcome = self.run_actions(sender, &script.actions, &mut touched);

        for address in &touched {
            if let Some(target) = self.targets.get_mut(address) {
                if outcome.is_ok() {
                    target.commit();
                } else {
                    target.discard();
                }
            }
        }
        outcome?;

        self.executions += 1;
        Ok(())
    }
}

impl ScriptExecutor {
    fn run_actions(
        &mut self,
        sender: &Pubkey,
        actions: &[ScriptAction],
        touched: &mut Vec<Pubkey>,
    ) -> Result<(), ExecutionError> {
        for action in actions {
            let target = self
                .targets
                .get_mut(&action.target)
                .ok_or(ExecutionError::UnknownTarget(action.target))?;
            if !touched.contains(&action.target) {
                touched.push(action.target);
            }
            target
                .call(sender, &action.calldata)
                .map_err(|reason| ExecutionError::TargetReverted {
                    target: action.target,
                    reason,
                })?;
            debug!(target = %action.target, %sender, "Script action staged");
        }
        Ok(())
    }
}
