//! The round context: the explicit alignment capability handed to the
//! aggregate program.
//!
//! There is no ambient or global alignment state. The engine builds one
//! `RoundContext` per round and threads it through the user program as
//! `&mut`; the four operators plus [`aligned_on`](RoundContext::aligned_on)
//! are the entire surface client code uses. Each operator is one specific
//! read/combine/write pattern against the current path, built on the shared
//! `scoped` primitive.
//!
//! All operators are `#[track_caller]`: the call-site token comes from the
//! caller's source location, so a hand-written call and a generated wrapper
//! produce identical paths.

use crate::envelope::{InboundEnvelopes, OutboundEnvelope};
use crate::errors::Result;
use crate::path::{render_pivot, AlignmentScope, Path, PathToken};
use crate::state::StateStore;
use crate::wire::ExchangeExport;
use fieldcast_core::{DeviceId, Field};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::panic::Location;

/// One round's execution context on one device.
pub struct RoundContext<'r> {
    device: DeviceId,
    scope: AlignmentScope,
    state: &'r StateStore,
    inbound: &'r InboundEnvelopes,
    outbound: OutboundEnvelope,
}

impl<'r> RoundContext<'r> {
    pub(crate) fn new(device: DeviceId, state: &'r StateStore, inbound: &'r InboundEnvelopes) -> Self {
        Self {
            device,
            scope: AlignmentScope::new(),
            state,
            inbound,
            outbound: OutboundEnvelope::new(),
        }
    }

    /// The device this round runs on.
    pub fn device(&self) -> DeviceId {
        self.device
    }

    /// The path of the innermost operator invocation at this instant.
    pub fn current_path(&self) -> Path {
        self.scope.current_path()
    }

    pub(crate) fn into_outbound(self) -> OutboundEnvelope {
        debug_assert_eq!(self.scope.depth(), 0, "alignment scope left unbalanced");
        self.outbound
    }

    // The shared primitive every operator goes through: push the token, hand
    // the body the resulting path, pop on every exit.
    fn scoped<R>(
        &mut self,
        token: PathToken,
        body: impl FnOnce(&mut Self, Path) -> Result<R>,
    ) -> Result<R> {
        self.scope.push(token);
        let path = self.scope.current_path();
        let out = body(self, path);
        self.scope.pop();
        out
    }

    /// Run `body` under a token derived from this call site and `pivot`.
    ///
    /// This is the explicit disambiguator for operator calls that would
    /// otherwise collide: every iteration of a loop hits the same call site,
    /// so an unguarded operator inside it computes the identical path and
    /// each iteration overwrites the previous export. Wrapping the body in
    /// `aligned_on` with a per-iteration pivot (the loop index, an element
    /// id) gives each instance its own path.
    #[track_caller]
    pub fn aligned_on<P, R>(
        &mut self,
        pivot: &P,
        body: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R>
    where
        P: Serialize,
    {
        let location = Location::caller();
        let token = PathToken::pivoted(location, render_pivot(pivot)?);
        self.scope.push(token);
        let out = body(self);
        self.scope.pop();
        out
    }

    /// Export `value` to neighbors and observe what they last sent here.
    ///
    /// No state-store read: the field's local entry is this round's `value`,
    /// its neighbor entries are the values the neighbors exported at this
    /// path in their most recent messages.
    #[track_caller]
    pub fn neighboring<T>(&mut self, value: T) -> Result<Field<DeviceId, T>>
    where
        T: Serialize + DeserializeOwned + PartialEq,
    {
        let location = Location::caller();
        self.scoped(PathToken::site(location), |ctx, path| {
            ctx.outbound.export(path.clone(), &value)?;
            ctx.inbound.field_at(&path, ctx.device, value)
        })
    }

    /// Carry a value across rounds while observing neighbors' carried values.
    ///
    /// The field's local entry is last round's own export at this path (or
    /// `initial` on the first visit), its neighbor entries are the neighbors'
    /// last shared values. `f` computes the new local value, which is
    /// exported and returned.
    #[track_caller]
    pub fn share<T>(&mut self, initial: T, f: impl FnOnce(&Field<DeviceId, T>) -> T) -> Result<T>
    where
        T: Serialize + DeserializeOwned + PartialEq,
    {
        let location = Location::caller();
        self.scoped(PathToken::site(location), |ctx, path| {
            let local = ctx.state.get::<T>(&path)?.unwrap_or(initial);
            let field = ctx.inbound.field_at(&path, ctx.device, local)?;
            let next = f(&field);
            ctx.outbound.export(path, &next)?;
            Ok(next)
        })
    }

    /// Like [`share`](Self::share), but `f` maps a whole field to a whole
    /// field, so the export can differ per neighbor.
    ///
    /// The returned field's local entry seeds next round's local slot; its
    /// neighbor entries are delivered to each neighbor individually through
    /// an [`ExchangeExport`] payload.
    #[track_caller]
    pub fn exchange<T>(
        &mut self,
        initial: T,
        f: impl FnOnce(Field<DeviceId, T>) -> Field<DeviceId, T>,
    ) -> Result<Field<DeviceId, T>>
    where
        T: Serialize + DeserializeOwned + PartialEq + Clone,
    {
        let location = Location::caller();
        self.scoped(PathToken::site(location), |ctx, path| {
            let local = match ctx.state.get::<ExchangeExport<T>>(&path)? {
                Some(previous) => previous.local,
                None => initial,
            };
            let field = ctx.inbound.exchange_field_at(&path, ctx.device, local)?;
            let next = f(field);
            debug_assert_eq!(
                next.local_id(),
                &ctx.device,
                "exchange body returned a field for another device"
            );
            ctx.outbound.export(path, &ExchangeExport::from_field(&next))?;
            Ok(next)
        })
    }

    /// Purely local memory across rounds: no field, no neighbor exchange.
    ///
    /// Reads last round's value at this path (or `initial`), applies `f`,
    /// exports the result so the commit carries it into next round's store.
    #[track_caller]
    pub fn evolve<T>(&mut self, initial: T, f: impl FnOnce(T) -> T) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let location = Location::caller();
        self.scoped(PathToken::site(location), |ctx, path| {
            let previous = ctx.state.get::<T>(&path)?.unwrap_or(initial);
            let next = f(previous);
            ctx.outbound.export(path, &next)?;
            Ok(next)
        })
    }
}
