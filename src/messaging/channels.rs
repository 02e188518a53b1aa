// Lock-free notification channel (audio error callback -> UI)

use crate::messaging::notification::Notification;
use ringbuf::{HeapRb, traits::Split};

pub type NotificationProducer = ringbuf::HeapProd<Notification>;
pub type NotificationConsumer = ringbuf::HeapCons<Notification>;

pub fn create_notification_channel(
    capacity: usize,
) -> (NotificationProducer, NotificationConsumer) {
    let rb = HeapRb::<Notification>::new(capacity);
    rb.split()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::notification::TrainerEvent;
    use ringbuf::traits::{Consumer, Producer};

    #[test]
    fn test_channel_delivers_in_order() {
        let (mut tx, mut rx) = create_notification_channel(4);

        tx.try_push(Notification::new(TrainerEvent::AudioConnected { sample_rate: 48000 }))
            .unwrap();
        tx.try_push(Notification::new(TrainerEvent::StreamError("xrun".to_string())))
            .unwrap();

        assert_eq!(
            rx.try_pop().map(|n| n.event),
            Some(TrainerEvent::AudioConnected { sample_rate: 48000 })
        );
        assert_eq!(
            rx.try_pop().map(|n| n.event),
            Some(TrainerEvent::StreamError("xrun".to_string()))
        );
        assert!(rx.try_pop().is_none());
    }

    #[test]
    fn test_channel_full_rejects() {
        let (mut tx, _rx) = create_notification_channel(1);
        assert!(tx
            .try_push(Notification::new(TrainerEvent::StreamError("a".to_string())))
            .is_ok());
        assert!(tx
            .try_push(Notification::new(TrainerEvent::StreamError("b".to_string())))
            .is_err());
    }
}
