//! Add-to-cart chime via the Web Audio API.

use std::cell::RefCell;

use wasm_bindgen::JsValue;
use web_sys::{AudioContext, OscillatorType};

const TONE_HZ: f32 = 880.0;
const TONE_SECONDS: f64 = 0.18;

thread_local! {
    // One context for every chime
    static CONTEXT: RefCell<Option<AudioContext>> = const { RefCell::new(None) };
}

/// Value held in `slot`, created by `make` on first use
fn reuse_or_create<T: Clone, E>(slot: &RefCell<Option<T>>, make: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
    let mut slot = slot.borrow_mut();
    if let Some(existing) = slot.as_ref() {
        return Ok(existing.clone());
    }
    let created = make()?;
    *slot = Some(created.clone());
    Ok(created)
}

/// Short sine blip with an exponential fade
pub fn play_add_to_cart_tone() -> Result<(), JsValue> {
    let ctx = CONTEXT.with(|slot| reuse_or_create(slot, AudioContext::new))?;
    // A context created before any user gesture starts suspended
    let _ = ctx.resume()?;
    let oscillator = ctx.create_oscillator()?;
    let gain = ctx.create_gain()?;
    let start = ctx.current_time();

    oscillator.set_type(OscillatorType::Sine);
    oscillator.frequency().set_value_at_time(TONE_HZ, start)?;
    oscillator
        .frequency()
        .exponential_ramp_to_value_at_time(TONE_HZ * 1.5, start + TONE_SECONDS / 2.0)?;
    gain.gain().set_value_at_time(0.15, start)?;
    gain.gain().exponential_ramp_to_value_at_time(0.001, start + TONE_SECONDS)?;

    oscillator.connect_with_audio_node(&gain)?;
    gain.connect_with_audio_node(&ctx.destination())?;
    oscillator.start()?;
    oscillator.stop_with_when(start + TONE_SECONDS)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_created_once() {
        let slot = RefCell::new(None);
        let mut created = 0;
        for _ in 0..3 {
            let value: Result<u32, ()> = reuse_or_create(&slot, || {
                created += 1;
                Ok(7)
            });
            assert_eq!(value, Ok(7));
        }
        assert_eq!(created, 1);
    }

    #[test]
    fn test_failed_creation_is_retried() {
        let slot: RefCell<Option<u32>> = RefCell::new(None);
        assert_eq!(reuse_or_create(&slot, || Err("blocked")), Err("blocked"));
        assert_eq!(reuse_or_create(&slot, || Ok::<_, &str>(3)), Ok(3));
    }
}
