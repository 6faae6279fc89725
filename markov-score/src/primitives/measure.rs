//! Measure contains events of one voice.
//!
//! Unlike a free-form container, measure here is filled strictly from
//! left to right: every placed event starts where the previous one
//! ended. Measure never holds more than its meter capacity.
//!
//! # Developer Note
//! Measure checks lengths and positions, but does not split events.
//! Splitting and tying lives in the layout assembler (`dom::layout`).

use crate::error::{MarkovScoreError, Result};

use super::{Dynamic, Event, EventInfo, Length, MeasureItem, Meter, RelativePosition, Tie};

#[derive(Debug, PartialEq, Clone)]
pub struct Measure {
    index: u32,
    meter: Meter,
    items: Vec<MeasureItem>,
    filled: Length,
}
impl Measure {
    pub fn new(index: u32, meter: Meter) -> Self {
        Self {
            index,
            meter,
            items: Vec::new(),
            filled: Length::zero(),
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }
    pub fn meter(&self) -> &Meter {
        &self.meter
    }
    pub fn capacity(&self) -> Length {
        self.meter.capacity()
    }
    /// Sum of placed event lengths.
    pub fn filled(&self) -> Length {
        self.filled
    }
    pub fn remaining(&self) -> Length {
        self.capacity()
            .checked_sub(self.filled)
            .unwrap_or_else(Length::zero)
    }
    pub fn items(&self) -> &Vec<MeasureItem> {
        &self.items
    }
    pub fn events(&self) -> impl Iterator<Item = &EventInfo> {
        self.items.iter().filter_map(|item| item.as_event())
    }
    /// True if no event is placed yet. Markers do not count.
    pub fn is_empty(&self) -> bool {
        self.events().next().is_none()
    }
    pub fn is_full(&self) -> bool {
        self.filled == self.capacity()
    }

    /// Change meter. Possible only while no event is placed.
    ///
    /// Leaves [MeasureItem::MeterChange] marker at the head of measure.
    pub fn set_meter(&mut self, meter: Meter) -> Result<()> {
        if !self.is_empty() {
            return Err(MarkovScoreError::LayoutInvariant {
                measure: self.index,
                reason: format!(
                    "meter change to {meter} in the middle of measure"
                ),
            });
        }
        self.items
            .retain(|item| !matches!(item, MeasureItem::MeterChange(_)));
        self.items.insert(0, MeasureItem::MeterChange(meter));
        self.meter = meter;
        Ok(())
    }

    pub fn push_dynamic(&mut self, dynamic: Dynamic) {
        self.items.push(MeasureItem::Dynamic(dynamic));
    }

    /// Place event right after the last one.
    ///
    /// # Errors
    /// if event has no positive finite length, or does not fit.
    pub fn place(&mut self, event: Event, tie: Tie) -> Result<&EventInfo> {
        if !event.length.is_valid_duration() {
            return Err(MarkovScoreError::LayoutInvariant {
                measure: self.index,
                reason: format!("invalid event length: {}", event.length),
            });
        }
        if event.length > self.remaining() {
            return Err(MarkovScoreError::LayoutInvariant {
                measure: self.index,
                reason: format!(
                    "event of {} does not fit into remaining {}",
                    event.length,
                    self.remaining()
                ),
            });
        }
        let position = RelativePosition::new(self.index, self.filled);
        self.filled = self.filled + event.length;
        self.items
            .push(MeasureItem::Event(EventInfo::new(position, event, tie)));
        match self.items.last() {
            Some(MeasureItem::Event(info)) => Ok(info),
            _ => Err(MarkovScoreError::LayoutInvariant {
                measure: self.index,
                reason: "placed event is lost".to_string(),
            }),
        }
    }

    /// Fill the rest of measure with one rest. Returns its length,
    /// if something was added.
    pub fn pad_with_rest(&mut self) -> Result<Option<Length>> {
        let remaining = self.remaining();
        if remaining.is_zero() {
            return Ok(None);
        }
        self.place(Event::rest(remaining), Tie::None)?;
        Ok(Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use crate::primitives::{
        Event, Length, MeasureItem, Meter, Pitch, PitchOrRest, RelativePosition,
        Tie,
    };

    use super::Measure;

    fn c4(length: Length) -> Event {
        Event::new(PitchOrRest::Pitch(Pitch::from_midi(60, None)), length, 64)
            .unwrap()
    }

    #[test]
    fn test_place() {
        let mut m = Measure::new(2, Meter::new(3, 4).unwrap());
        assert!(m.is_empty());
        m.place(c4(Length::from(1.0)), Tie::None).unwrap();
        let second = m.place(c4(Length::from(1.5)), Tie::None).unwrap();
        assert_eq!(second.position, RelativePosition::new(2, Length::from(1.0)));
        assert_eq!(m.remaining(), Length::new(1, 2));
        assert!(m.place(c4(Length::from(1.0)), Tie::None).is_err());
        assert!(m.place(c4(Length::zero()), Tie::None).is_err());
        assert_eq!(m.pad_with_rest().unwrap(), Some(Length::new(1, 2)));
        assert!(m.is_full());
        assert_eq!(m.pad_with_rest().unwrap(), None);
    }

    #[test]
    fn test_set_meter_only_when_empty() {
        let mut m = Measure::new(5, Meter::default());
        m.set_meter(Meter::new(3, 4).unwrap()).unwrap();
        assert_eq!(m.capacity(), Length::from(3.0));
        assert_eq!(
            m.items()[0],
            MeasureItem::MeterChange(Meter::new(3, 4).unwrap())
        );
        m.place(c4(Length::from(1.0)), Tie::None).unwrap();
        assert!(m.set_meter(Meter::default()).is_err());
    }
}
