//! `ContinuousData` table accessors, laid out the way flatc generates them

use flatbuffers::{
    Follow, ForwardsUOffset, InvalidFlatbuffer, Table, VOffsetT, Verifiable, Verifier, Vector,
};

/// Read-only view of a ContinuousData table inside a received buffer
#[derive(Copy, Clone)]
pub struct ContinuousData<'a> {
    _tab: Table<'a>,
}

impl<'a> Follow<'a> for ContinuousData<'a> {
    type Inner = ContinuousData<'a>;

    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Self {
            _tab: Table::new(buf, loc),
        }
    }
}

impl<'a> ContinuousData<'a> {
    pub const VT_SAMPLES: VOffsetT = 4;
    pub const VT_N_CHANNELS: VOffsetT = 6;
    pub const VT_N_SAMPLES: VOffsetT = 8;
    pub const VT_TIMESTAMP: VOffsetT = 10;
    pub const VT_MESSAGE_ID: VOffsetT = 12;
    pub const VT_SAMPLE_RATE: VOffsetT = 14;

    /// Verify `buf` and return its root table
    pub fn root(buf: &'a [u8]) -> Result<Self, InvalidFlatbuffer> {
        flatbuffers::root::<ContinuousData>(buf)
    }

    /// Channel-major samples
    #[inline]
    pub fn samples(&self) -> Option<Vector<'a, f32>> {
        // Safety: the table was verified by `root`
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, f32>>>(Self::VT_SAMPLES, None)
        }
    }

    #[inline]
    pub fn n_channels(&self) -> u32 {
        unsafe { self._tab.get::<u32>(Self::VT_N_CHANNELS, Some(0)).unwrap_or(0) }
    }

    #[inline]
    pub fn n_samples(&self) -> u32 {
        unsafe { self._tab.get::<u32>(Self::VT_N_SAMPLES, Some(0)).unwrap_or(0) }
    }

    #[inline]
    pub fn timestamp(&self) -> u64 {
        unsafe { self._tab.get::<u64>(Self::VT_TIMESTAMP, Some(0)).unwrap_or(0) }
    }

    /// Sequence number of the frame
    #[inline]
    pub fn message_id(&self) -> u64 {
        unsafe { self._tab.get::<u64>(Self::VT_MESSAGE_ID, Some(0)).unwrap_or(0) }
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        unsafe { self._tab.get::<u32>(Self::VT_SAMPLE_RATE, Some(0)).unwrap_or(0) }
    }
}

impl Verifiable for ContinuousData<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<ForwardsUOffset<Vector<'_, f32>>>("samples", Self::VT_SAMPLES, false)?
            .visit_field::<u32>("n_channels", Self::VT_N_CHANNELS, false)?
            .visit_field::<u32>("n_samples", Self::VT_N_SAMPLES, false)?
            .visit_field::<u64>("timestamp", Self::VT_TIMESTAMP, false)?
            .visit_field::<u64>("message_id", Self::VT_MESSAGE_ID, false)?
            .visit_field::<u32>("sample_rate", Self::VT_SAMPLE_RATE, false)?
            .finish();
        Ok(())
    }
}
