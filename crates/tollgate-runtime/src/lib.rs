//! Tollgate Runtime
//!
//! Hosts a tollgate instance together with in-memory collaborators: a
//! permission registry, a token ledger and a call-script executor. Every entry
//! point runs under one lock so calls on an instance are linearized.

// ================================
// Module Declarations
// ================================

pub mod acl;
pub mod core;
pub mod event_stream;
pub mod executor;
pub mod ledger;

// ================================
// Public API Re-exports
// ================================

pub use crate::core::{DeploymentConfig, Result, RuntimeError};
pub use acl::{AclError, PermissionRegistry, ANY_ENTITY};
pub use event_stream::{EventStream, RuntimeEvent};
pub use executor::{
    encode_call_script, CallScript, CounterTarget, ExecutionTarget, RevertingTarget, ScriptAction,
    ScriptExecutor, CALLS_SCRIPT_VERSION, EXECUTE_SELECTOR,
};
pub use ledger::{TokenLedger, TokenMetadata};

// ================================
// Main Runtime Implementation
// ================================

use anchor_lang::prelude::Pubkey;
use tokio::sync::{broadcast, Mutex};
use tollgate::{Forwarded, Forwarder, Role, Tollgate, TollgateEvent};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber, filtered by `RUST_LOG` (default `info`).
/// Later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// State guarded by the runtime lock
pub struct Host {
    pub tollgate: Tollgate,
    pub acl: PermissionRegistry,
    pub ledger: TokenLedger,
    pub executor: ScriptExecutor,
}

impl Host {
    fn new(tollgate: Tollgate) -> Self {
        Self {
            tollgate,
            acl: PermissionRegistry::new(),
            ledger: TokenLedger::new(),
            executor: ScriptExecutor::new(),
        }
    }
}

/// Runtime hosting one tollgate instance
pub struct TollgateRuntime {
    instance: Pubkey,
    host: Mutex<Host>,
    event_stream: EventStream,
}

impl TollgateRuntime {
    /// Host an unconfigured instance
    pub fn new(instance: Pubkey) -> Self {
        Self::with_tollgate(Tollgate::new(instance), EventStream::default())
    }

    /// Host a petrified template instance
    pub fn template(instance: Pubkey) -> Self {
        Self::with_tollgate(Tollgate::petrified(instance), EventStream::default())
    }

    /// Create and initialize an instance in one step.
    ///
    /// The fee token is registered on the hosted ledger if it is not known yet.
    pub async fn install(config: &DeploymentConfig) -> Result<Self> {
        config.validate()?;
        let instance = config.instance.unwrap_or_else(Pubkey::new_unique);
        let runtime = Self::with_tollgate(
            Tollgate::new(instance),
            EventStream::new(config.event_buffer),
        );

        {
            let mut host = runtime.host.lock().await;
            if host.ledger.metadata(&config.fee_token).is_err() {
                host.ledger.create_token(
                    config.fee_token,
                    TokenMetadata {
                        name: "Fee Token".to_string(),
                        symbol: "FEE".to_string(),
                        decimals: 18,
                    },
                )?;
            }
        }

        runtime
            .initialize(config.fee_token, config.fee_amount, config.fee_destination)
            .await?;
        Ok(runtime)
    }

    fn with_tollgate(tollgate: Tollgate, event_stream: EventStream) -> Self {
        info!(instance = %tollgate.instance(), "Hosting tollgate instance");
        Self {
            instance: tollgate.instance(),
            host: Mutex::new(Host::new(tollgate)),
            event_stream,
        }
    }

    pub fn instance(&self) -> Pubkey {
        self.instance
    }

    /// Subscribe to runtime events
    pub fn subscribe(&self) -> broadcast::Receiver<RuntimeEvent> {
        self.event_stream.subscribe()
    }

    pub fn event_stream(&self) -> &EventStream {
        &self.event_stream
    }

    /// Run `f` against the hosted state under the runtime lock
    pub async fn with_host<R>(&self, f: impl FnOnce(&mut Host) -> R) -> R {
        let mut host = self.host.lock().await;
        f(&mut *host)
    }

    // Tollgate entry points

    pub async fn initialize(
        &self,
        fee_token: Pubkey,
        fee_amount: u128,
        fee_destination: Pubkey,
    ) -> Result<()> {
        let mut host = self.host.lock().await;
        host.tollgate.initialize(fee_token, fee_amount, fee_destination)?;

        self.event_stream.emit(RuntimeEvent::Initialized {
            instance: self.instance.to_string(),
            fee_token: fee_token.to_string(),
            fee_amount,
            fee_destination: fee_destination.to_string(),
        });
        Ok(())
    }

    pub async fn change_fee_amount(&self, sender: &Pubkey, new_amount: u128) -> Result<TollgateEvent> {
        let mut host = self.host.lock().await;
        let Host { tollgate, acl, .. } = &mut *host;
        let event = tollgate.change_fee_amount(&*acl, sender, new_amount)?;

        self.publish(&event);
        Ok(event)
    }

    pub async fn change_fee_destination(
        &self,
        sender: &Pubkey,
        new_destination: Pubkey,
    ) -> Result<TollgateEvent> {
        let mut host = self.host.lock().await;
        let Host { tollgate, acl, .. } = &mut *host;
        let event = tollgate.change_fee_destination(&*acl, sender, new_destination)?;

        self.publish(&event);
        Ok(event)
    }

    pub async fn forward(&self, sender: &Pubkey, payload: &[u8]) -> Result<Forwarded> {
        let mut host = self.host.lock().await;
        let Host {
            tollgate,
            ledger,
            executor,
            ..
        } = &mut *host;

        match tollgate.forward(ledger, executor, sender, payload) {
            Ok(forwarded) => {
                self.event_stream.emit(RuntimeEvent::Forwarded {
                    instance: self.instance.to_string(),
                    sender: sender.to_string(),
                    fee_paid: forwarded.fee.map_or(0, |receipt| receipt.amount),
                });
                Ok(forwarded)
            }
            Err(err) => {
                self.event_stream.emit(RuntimeEvent::ForwardRejected {
                    instance: self.instance.to_string(),
                    sender: sender.to_string(),
                    code: err.code().to_string(),
                });
                Err(err.into())
            }
        }
    }

    pub async fn is_forwarder(&self) -> bool {
        self.host.lock().await.tollgate.is_forwarder()
    }

    pub async fn can_forward(&self, sender: &Pubkey, payload: &[u8]) -> bool {
        self.host.lock().await.tollgate.can_forward(sender, payload)
    }

    pub async fn forward_fee(&self) -> (Pubkey, u128) {
        self.host.lock().await.tollgate.forward_fee()
    }

    /// Copy of the hosted tollgate state
    pub async fn snapshot(&self) -> Tollgate {
        self.host.lock().await.tollgate.clone()
    }

    // Collaborator setup

    /// Grant `role` on this instance to `entity`, managed by `manager`
    pub async fn create_permission(&self, entity: Pubkey, role: Role, manager: Pubkey) -> Result<()> {
        let mut host = self.host.lock().await;
        host.acl.create_permission(entity, self.instance, role, manager)?;
        Ok(())
    }

    /// Set the allowance `owner` grants this instance on `token`
    pub async fn approve(&self, token: &Pubkey, owner: &Pubkey, amount: u128) -> Result<()> {
        let mut host = self.host.lock().await;
        host.ledger.approve(token, owner, &self.instance, amount)?;
        Ok(())
    }

    pub async fn mint(&self, token: &Pubkey, to: &Pubkey, amount: u128) -> Result<()> {
        let mut host = self.host.lock().await;
        host.ledger.mint(token, to, amount)?;
        Ok(())
    }

    pub async fn balance_of(&self, token: &Pubkey, owner: &Pubkey) -> Result<u128> {
        let host = self.host.lock().await;
        Ok(host.ledger.balance_of(token, owner)?)
    }

    pub async fn register_target(&self, address: Pubkey, target: impl ExecutionTarget + 'static) {
        let mut host = self.host.lock().await;
        host.executor.register_target(address, target);
    }

    fn publish(&self, event: &TollgateEvent) {
        self.event_stream
            .emit(RuntimeEvent::from_tollgate(self.instance.to_string(), event));
    }
}
