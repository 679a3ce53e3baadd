//! System Register Access.
//!
//! This module implements the `crN = Rs` / `Rd = crN` style transfers to the
//! system register file. It performs the following:
//! 1. **Routing:** Per-thread registers live in the thread, global ones in the shared block.
//! 2. **Side Effects:** Merged `BADVA` reads, read-only `HTID`/`REV`, `IMASK` width.
//! 3. **Cache Operations:** Tag reads and maintenance instructions, which have no
//!    modelled cache behind them.

use tracing::{debug, trace};

use super::HexThread;
use crate::common::constants::NUM_SREGS;
use crate::core::arch::sreg::{self, BADVA, BADVA0, BADVA1, HTID, IMASK, SSR, SSR_BVS};

/// Cache maintenance instructions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheOp {
    /// `icinva`: invalidate instruction cache line by address.
    IcInvA,
    /// `ickill`: invalidate the whole instruction cache.
    IcKill,
    /// `dccleana`: clean data cache line by address.
    DcCleanA,
    /// `dcinva`: invalidate data cache line by address.
    DcInvA,
    /// `dccleaninva`: clean and invalidate data cache line by address.
    DcCleanInvA,
    /// `dczeroa`: zero a data cache line.
    DcZeroA,
    /// `dckill`: invalidate the whole data cache.
    DcKill,
    /// `l2kill`: invalidate the whole L2.
    L2Kill,
}

impl HexThread {
    /// Reads system register `reg`.
    ///
    /// `BADVA` returns `BADVA1` when `SSR.BVS` is set and `BADVA0` otherwise.
    /// Numbers beyond the register file read as zero.
    pub fn read_sreg(&self, reg: usize) -> u32 {
        match reg {
            r if r >= NUM_SREGS => {
                debug!(target: "hexsim::regs", tid = self.tid, reg = r, "read of unknown sreg");
                0
            }
            BADVA => {
                if SSR_BVS.is_set(self.sregs.get(SSR)) {
                    self.sregs.get(BADVA1)
                } else {
                    self.sregs.get(BADVA0)
                }
            }
            HTID => self.tid as u32,
            r if sreg::is_thread_local(r) => self.sregs.get(r),
            r => self.shared.read_global(r),
        }
    }

    /// Writes system register `reg`.
    ///
    /// `HTID` is read-only. A write to `BADVA` lands in the slot selected by
    /// `SSR.BVS`. Writes to numbers beyond the register file are dropped.
    pub fn write_sreg(&mut self, reg: usize, val: u32) {
        trace!(target: "hexsim::regs", tid = self.tid, reg, val = format_args!("{val:#010x}"), "sreg write");
        match reg {
            r if r >= NUM_SREGS => {
                debug!(target: "hexsim::regs", tid = self.tid, reg = r, "write to unknown sreg dropped");
            }
            HTID => {}
            BADVA => {
                let slot = if SSR_BVS.is_set(self.sregs.get(SSR)) { BADVA1 } else { BADVA0 };
                self.sregs.set(slot, val);
            }
            IMASK => self.sregs.set(IMASK, val & 0xffff),
            r if sreg::is_thread_local(r) => self.sregs.set(r, val),
            r => self.shared.write_global(r, val),
        }
    }

    /// `ictagr`: instruction cache tag read. No cache is modelled; reads zero.
    pub const fn ictagr(&self, _index: u32) -> u32 {
        0
    }

    /// `dctagr`: data cache tag read. No cache is modelled; reads zero.
    pub const fn dctagr(&self, _index: u32) -> u32 {
        0
    }

    /// Executes a cache maintenance instruction. No cache is modelled.
    pub fn cache_op(&self, op: CacheOp, addr: u32) {
        trace!(target: "hexsim::regs", tid = self.tid, ?op, addr = format_args!("{addr:#010x}"), "cache op ignored");
    }
}
