use core::hash::Hash;
use im::{HashMap, Vector};

pub trait OrDefault<K, V> {
    fn get_or_default(&self, item: &K) -> V;
}

impl<K, V> OrDefault<K, V> for HashMap<K, V>
where
    K: Eq + PartialEq + Hash,
    V: Default + Clone,
{
    fn get_or_default(&self, item: &K) -> V {
        match self.get(item) {
            Some(v) => v.clone(),
            None => V::default(),
        }
    }
}

pub trait PushImmut<T> {
    fn push(&self, item: T) -> Vector<T>;
}
impl<T: Clone> PushImmut<T> for Vector<T> {
    fn push(&self, item: T) -> Vector<T> {
        let mut result = self.clone();
        result.push_back(item);
        result
    }
}

#[cfg(test)]
mod tests {
    use im::{HashMap, Vector};

    use super::{OrDefault, PushImmut};

    #[test]
    fn missing_keys_give_default() {
        let map: HashMap<String, String> = HashMap::unit(String::from("a"), String::from("b"));
        assert_eq!(map.get_or_default(&String::from("a")), "b");
        assert_eq!(map.get_or_default(&String::from("z")), "");
    }

    #[test]
    fn push_leaves_original_untouched() {
        let original: Vector<u8> = Vector::unit(1);
        let pushed = original.push(2);
        assert_eq!(original.len(), 1);
        assert_eq!(pushed, Vector::from(vec![1, 2]));
    }
}
